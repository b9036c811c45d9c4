fn main() {
    if let Err(e) = gonec_drv::main() {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
