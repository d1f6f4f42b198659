fn main() {
    std::process::exit(qoder_reset_lib::run());
}
