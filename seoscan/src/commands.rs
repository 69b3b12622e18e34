use crate::CLAP_STYLING;
use clap::{arg, command};

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("seoscan")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("seoscan")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("analyze")
                .about(
                    "Expand a sitemap tree and analyze every listed page for common SEO \
                issues.",
                )
                .arg(
                    arg!(-u --"url" <SITEMAP_URL>)
                        .required(true)
                        .help("The sitemap URL to expand and analyze"),
                )
                .arg(
                    arg!(-c --"concurrency" <NUM>)
                        .required(false)
                        .help("Number of pages fetched concurrently per batch")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("5"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)"),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                )
                .arg(
                    arg!(--"stream")
                        .required(false)
                        .help("Print raw server-sent events instead of a progress bar")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"incremental-total")
                        .required(false)
                        .help("Update the progress total while nested sitemaps resolve")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("discover")
                .about(
                    "Probe a domain for candidate sitemap URLs using robots.txt and \
                well-known paths.",
                )
                .arg(
                    arg!(-d --"domain" <DOMAIN>)
                        .required(true)
                        .help("The domain to probe, e.g. example.com"),
                ),
        )
}
