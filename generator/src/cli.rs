use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[clap(version, about)]
pub struct Cli {
    #[clap(value_parser, help = "The registry XML file")]
    pub input: PathBuf,

    #[clap(long, default_value = "gl", help = "API name to link, e.g. gl or gles2")]
    pub api: String,

    #[clap(long, default_value = "3.3", help = "Target version number, e.g. 3.3")]
    pub version: String,

    #[clap(long, default_value = "core", help = "Profile to resolve, e.g. core")]
    pub profile: String,

    #[clap(
        long = "extension",
        help = "Only link the named extension (repeatable); omit to link all compatible ones"
    )]
    pub extensions: Vec<String>,

    #[clap(long, short, help = "Output file; stdout if omitted")]
    pub output: Option<PathBuf>,

    #[clap(long, help = "C fragment emitted ahead of the generated tables")]
    pub prefix: Option<PathBuf>,

    #[clap(long, help = "C fragment emitted after the generated tables")]
    pub suffix: Option<PathBuf>,

    #[clap(long, help = "List the discovered APIs and their profiles, then exit")]
    pub list_apis: bool,
}
