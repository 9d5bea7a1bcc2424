//! Charging-voltage correction.
//!
//! While charge current flows the terminal voltage sits above the resting
//! (open-circuit) voltage the level curve is defined for.  A measured
//! lookup table maps each charging reading to the resting voltage the
//! cell settled to afterwards.
//!
//! Lookup: binary search on the charging column.  An exact hit returns its
//! resting value; a miss returns the resting value of the nearest entry
//! above the input.  Inputs above the whole table pass through unchanged.

use crate::error::TableError;

/// Capacity of a [`CalibrationTable`].
pub const MAX_CALIBRATION_POINTS: usize = 256;

/// One (charging, resting) pair, both in millivolts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationPoint {
    pub charging_mv: u16,
    pub resting_mv: u16,
}

impl CalibrationPoint {
    pub const fn new(charging_mv: u16, resting_mv: u16) -> Self {
        Self {
            charging_mv,
            resting_mv,
        }
    }
}

/// Charge curve measured on the stock cell and charger, keyed by charging
/// voltage.  Repeated charging readings keep the lowest resting value.
#[rustfmt::skip]
const CHARGE_CURVE: [(u16, u16); 165] = [
    (3428, 3362), (3442, 3352), (3482, 3372), (3492, 3400), (3504, 3390), (3514, 3404),
    (3518, 3416), (3522, 3432), (3528, 3436), (3532, 3428), (3540, 3442), (3544, 3448),
    (3550, 3460), (3556, 3464), (3562, 3458), (3564, 3450), (3570, 3486), (3576, 3478),
    (3578, 3484), (3584, 3514), (3588, 3490), (3590, 3500), (3592, 3538), (3600, 3526),
    (3606, 3510), (3610, 3506), (3612, 3508), (3614, 3530), (3616, 3540), (3618, 3544),
    (3626, 3532), (3632, 3536), (3634, 3548), (3644, 3550), (3648, 3570), (3650, 3562),
    (3652, 3578), (3658, 3588), (3660, 3572), (3662, 3580), (3668, 3574), (3670, 3606),
    (3674, 3614), (3676, 3590), (3680, 3592), (3688, 3630), (3690, 3600), (3692, 3638),
    (3704, 3632), (3706, 3634), (3710, 3602), (3712, 3656), (3716, 3644), (3720, 3640),
    (3726, 3642), (3736, 3646), (3740, 3652), (3748, 3668), (3754, 3666), (3756, 3662),
    (3762, 3690), (3764, 3686), (3766, 3674), (3772, 3684), (3782, 3692), (3784, 3688),
    (3788, 3704), (3790, 3712), (3792, 3700), (3804, 3710), (3808, 3716), (3812, 3726),
    (3816, 3738), (3818, 3740), (3826, 3748), (3836, 3746), (3840, 3754), (3846, 3764),
    (3850, 3768), (3854, 3766), (3858, 3772), (3862, 3784), (3866, 3792), (3868, 3858),
    (3872, 3790), (3878, 3808), (3886, 3798), (3888, 3814), (3890, 3810), (3896, 3818),
    (3898, 3820), (3906, 3828), (3908, 3826), (3910, 3836), (3914, 3840), (3918, 3846),
    (3920, 3854), (3922, 3842), (3934, 3862), (3946, 3866), (3950, 3886), (3954, 3868),
    (3956, 3882), (3960, 3888), (3962, 3896), (3966, 3890), (3974, 3898), (3980, 3918),
    (3988, 3910), (3992, 3930), (3994, 3920), (3998, 3926), (4008, 3934), (4010, 3942),
    (4014, 3946), (4016, 3932), (4020, 3948), (4024, 3956), (4028, 3954), (4030, 3964),
    (4036, 3966), (4038, 3974), (4042, 3970), (4048, 3978), (4060, 3988), (4068, 3998),
    (4070, 3994), (4074, 4016), (4082, 4020), (4090, 4024), (4094, 4028), (4096, 4032),
    (4112, 4046), (4114, 4038), (4116, 4052), (4124, 4056), (4126, 4064), (4132, 4060),
    (4136, 4068), (4144, 4124), (4146, 4074), (4150, 4086), (4152, 4082), (4156, 4090),
    (4164, 4094), (4166, 4112), (4170, 4114), (4172, 4110), (4182, 4126), (4186, 4120),
    (4192, 4130), (4196, 4142), (4200, 4140), (4208, 4146), (4210, 4150), (4212, 4148),
    (4214, 4144), (4216, 4152), (4220, 4168), (4222, 4166), (4226, 4182), (4230, 4174),
    (4232, 4178), (4233, 4196), (4236, 4190),
];

/// Validated lookup table, strictly ascending in `charging_mv`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalibrationTable {
    points: heapless::Vec<CalibrationPoint, MAX_CALIBRATION_POINTS>,
}

impl CalibrationTable {
    pub fn new(points: &[CalibrationPoint]) -> Result<Self, TableError> {
        if points.is_empty() {
            return Err(TableError::TooFewPoints);
        }
        let points: heapless::Vec<CalibrationPoint, MAX_CALIBRATION_POINTS> =
            heapless::Vec::from_slice(points).map_err(|()| TableError::TooManyPoints)?;

        if let Some(index) = points
            .windows(2)
            .position(|pair| pair[1].charging_mv <= pair[0].charging_mv)
        {
            return Err(TableError::NotAscending { index: index + 1 });
        }

        Ok(Self { points })
    }

    /// The built-in charge curve.
    pub fn builtin() -> Self {
        Self {
            points: CHARGE_CURVE
                .iter()
                .map(|&(charging_mv, resting_mv)| CalibrationPoint::new(charging_mv, resting_mv))
                .collect(),
        }
    }

    pub fn points(&self) -> &[CalibrationPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl Default for CalibrationTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Maps charging readings to resting-equivalent millivolts.
#[derive(Debug, Clone, Default)]
pub struct ChargeCurveCorrector {
    table: CalibrationTable,
}

impl ChargeCurveCorrector {
    pub fn new(table: CalibrationTable) -> Self {
        Self { table }
    }

    pub fn correct(&self, charging_mv: f32) -> f32 {
        let points = self.table.points();
        match points.binary_search_by(|p| f32::from(p.charging_mv).total_cmp(&charging_mv)) {
            Ok(hit) => f32::from(points[hit].resting_mv),
            Err(above) => points
                .get(above)
                .map_or(charging_mv, |p| f32::from(p.resting_mv)),
        }
    }
}
