mod cli;
mod emit;

use std::collections::BTreeSet;
use std::fmt::Display;
use std::process::ExitCode;

use clap::Parser;
use gl_registry::link;

fn fail(message: impl Display) -> ! {
    eprintln!("error: {message}");
    std::process::exit(1);
}

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    let document = std::fs::read_to_string(&cli.input)
        .unwrap_or_else(|error| fail(format_args!("{}: {error}", cli.input.display())));
    let registry = gl_registry::parse_registry(&document).unwrap_or_else(|error| fail(error));
    let apis = link(&registry).unwrap_or_else(|error| fail(error));

    if cli.list_apis {
        for api in apis.values() {
            let versions: Vec<&str> = api
                .features
                .iter()
                .map(|feature| feature.number.as_str())
                .collect();
            let profiles: Vec<&str> = api.profiles().into_iter().collect();
            println!(
                "{} versions: {} profiles: {}",
                api.name,
                versions.join(" "),
                profiles.join(" ")
            );
        }
        return ExitCode::SUCCESS;
    }

    let Some(api) = apis.get(cli.api.as_str()) else {
        fail(format_args!("api {:?} not found in registry", cli.api));
    };
    let Some(chain) = api.link_version(&cli.version, &cli.profile) else {
        fail(format_args!(
            "api {:?} has no version {:?}",
            cli.api, cli.version
        ));
    };

    let filter: Option<BTreeSet<String>> = if cli.extensions.is_empty() {
        None
    } else {
        Some(cli.extensions.iter().cloned().collect())
    };
    let extensions = api
        .link_extensions(&cli.profile, filter.as_ref())
        .unwrap_or_else(|error| fail(error));

    let prefix = match &cli.prefix {
        Some(path) => std::fs::read_to_string(path)
            .unwrap_or_else(|error| fail(format_args!("{}: {error}", path.display()))),
        None => emit::DEFAULT_PROLOGUE.to_owned(),
    };
    let suffix = cli.suffix.as_ref().map(|path| {
        std::fs::read_to_string(path)
            .unwrap_or_else(|error| fail(format_args!("{}: {error}", path.display())))
    });

    let header = emit::generate(&registry, &chain, &extensions, &prefix, suffix.as_deref())
        .unwrap_or_else(|error| fail(error));

    match &cli.output {
        Some(path) => std::fs::write(path, header)
            .unwrap_or_else(|error| fail(format_args!("{}: {error}", path.display()))),
        None => print!("{header}"),
    }
    ExitCode::SUCCESS
}
