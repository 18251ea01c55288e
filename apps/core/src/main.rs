fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match docsearch_core::runtime::parse_cli_args(&args) {
        Ok(options) => options,
        Err(error) => {
            eprintln!("[docsearch-core] {error}");
            std::process::exit(2);
        }
    };

    if options.show_help {
        println!("{}", docsearch_core::runtime::USAGE);
        return;
    }

    if let Err(error) = docsearch_core::runtime::run_with_options(options) {
        eprintln!("[docsearch-core] runtime failed: {error}");
        std::process::exit(1);
    }
}
