use xshell::{Cmd, Shell};

/// Feature combinations which must each build and pass tests.
const FEATURE_SETS: &[&str] = &[
    "--no-default-features",
    "--features=std",
    "--features=sync",
    "--features=async",
    "--features=sync,async",
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sh = &Shell::new()?;
    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(|s| &**s).collect();
    match *args {
        ["test"] => {
            for features in FEATURE_SETS {
                cargo(sh).args(["test", features]).run()?;
            }
            cargo(sh).args(["clippy", "--all-features"]).run()?;
            cargo(sh).args(["doc", "--all-features"]).run()?;
        }
        ["lint"] => {
            for features in FEATURE_SETS {
                cargo(sh).args(["clippy", "--all-targets", features]).run()?;
            }
        }
        _ => {
            return Err(format!("invalid arguments: {args:?}").into());
        }
    }

    Ok(())
}

fn cargo(sh: &Shell) -> Cmd<'_> {
    sh.cmd(std::env::var("CARGO").expect("CARGO environment variable not set"))
}
