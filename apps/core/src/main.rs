fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match quickmark_core::runtime::parse_cli_args(&args) {
        Ok(options) => options,
        Err(error) => {
            eprintln!("[quickmark-core] {error}");
            std::process::exit(2);
        }
    };

    if let Err(error) = quickmark_core::runtime::run_with_options(options) {
        eprintln!("[quickmark-core] runtime failed: {error}");
        std::process::exit(1);
    }
}
