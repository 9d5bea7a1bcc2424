fn main() {
    println!("cargo:rerun-if-env-changed=TFTBOX_BOARD_CONFIG");

    // Only the firmware image needs the ESP-IDF environment; host builds
    // (tests, fuzzing) skip it.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
