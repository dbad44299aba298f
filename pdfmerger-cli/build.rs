use clap::CommandFactory;

#[path = "src/cli.rs"]
#[allow(dead_code)]
mod cli;

fn main() -> std::io::Result<()> {
    println!("cargo:rerun-if-changed=src/cli.rs");

    let out_dir =
        std::path::PathBuf::from(std::env::var_os("OUT_DIR").ok_or(std::io::ErrorKind::NotFound)?);
    let cmd = cli::Cli::command();

    let man = clap_mangen::Man::new(cmd.clone());
    let mut buffer: Vec<u8> = Default::default();
    man.render(&mut buffer)?;
    std::fs::write(out_dir.join("pdfmerger.1"), buffer)?;

    // One page per subcommand, named like git's: pdfmerger-merge.1
    for sub in cmd.get_subcommands() {
        let name = format!("pdfmerger-{}", sub.get_name());
        let page = clap_mangen::Man::new(sub.clone().name(name.clone()));
        let mut buffer: Vec<u8> = Default::default();
        page.render(&mut buffer)?;
        std::fs::write(out_dir.join(format!("{name}.1")), buffer)?;
    }

    Ok(())
}
