use std::env;
use std::process::ExitCode;

use log::LevelFilter;
use titik_fiksi::{
    adjacency_confirmed, filter_chapters, load_works, load_writings, locate, render_body,
    resolve_catalog, ContentSource, DirSource, NavTarget, SiteConfig, SiteError,
};

const DEFAULT_ROOT: &str = ".";

#[derive(Clone, Debug, PartialEq, Eq)]
enum Command {
    Works,
    Writings,
    Chapters { slug: String, query: String },
    Chapter { slug: String, code: String },
}

#[derive(Clone, Debug)]
struct Args {
    root: String,
    config_path: Option<String>,
    command: Command,
}

fn main() -> ExitCode {
    if let Err(err) = init_logging() {
        eprintln!("warning: {}", err);
    }

    match run(env::args().collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("error: {}", msg);
            eprintln!("{}", help_text());
            ExitCode::FAILURE
        }
    }
}

fn init_logging() -> Result<(), log::SetLoggerError> {
    env_logger::builder()
        .filter_level(LevelFilter::Warn)
        .parse_default_env()
        .try_init()
}

fn run(args: Vec<String>) -> Result<(), String> {
    let cli = parse_args(args)?;
    let config = match &cli.config_path {
        Some(path) => SiteConfig::from_json_file(path)?,
        None => SiteConfig::default(),
    };
    let source = DirSource::new(&cli.root);
    let out = execute(&cli.command, &source, &config)?;
    print!("{}", out);
    Ok(())
}

fn execute<S: ContentSource + ?Sized>(
    command: &Command,
    source: &S,
    config: &SiteConfig,
) -> Result<String, String> {
    let mut out = String::new();
    match command {
        Command::Works => match load_works(source, &config.paths)
            .require(&config.paths.works, "works")
        {
            Err(SiteError::CatalogEmpty { .. }) => out.push_str("no novels\n"),
            Err(err) => return Err(err.to_string()),
            Ok(works) => {
                for work in works {
                    out.push_str(&format!(
                        "{}\t{}\t{}\t{}\n",
                        work.normalized_slug(),
                        work.title,
                        work.genre,
                        work.status
                    ));
                }
            }
        },
        Command::Writings => match load_writings(source, &config.paths)
            .require(&config.paths.writings, "writings")
        {
            Err(SiteError::CatalogEmpty { .. }) => out.push_str("no writings\n"),
            Err(err) => return Err(err.to_string()),
            Ok(writings) => {
                for writing in writings {
                    out.push_str(&format!(
                        "{}\t{}\t{}\n",
                        writing.normalized_slug(),
                        writing.title,
                        writing.category
                    ));
                }
            }
        },
        Command::Chapters { slug, query } => {
            let catalog = resolve_catalog(source, config, slug);
            if catalog.is_empty() {
                out.push_str("no published chapters\n");
            }
            for chapter in filter_chapters(catalog.chapters(), query) {
                out.push_str(&format!("{}\t{}\n", chapter.code, chapter.title));
            }
        }
        Command::Chapter { slug, code } => {
            let catalog = resolve_catalog(source, config, slug);
            let (_, chapter) = locate(&catalog, code).map_err(|e| e.to_string())?;
            let nav =
                adjacency_confirmed(source, config, &catalog, code).map_err(|e| e.to_string())?;
            out.push_str(&format!("# {} {}\n", chapter.code, chapter.title));
            out.push_str(&format!("prev: {}\n", side_label(&nav.prev)));
            out.push_str(&format!("next: {}\n", side_label(&nav.next)));
            out.push_str(&render_body(Some(chapter.content.as_str())));
            out.push('\n');
        }
    }
    Ok(out)
}

fn side_label(target: &NavTarget) -> &str {
    target.code().unwrap_or("-")
}

fn parse_args(args: Vec<String>) -> Result<Args, String> {
    if args.len() >= 2 && (args[1] == "--help" || args[1] == "-h") {
        return Err("help requested".to_string());
    }

    let mut root = DEFAULT_ROOT.to_string();
    let mut config_path = None;
    let mut query = String::new();
    let mut positional = Vec::new();

    let mut i = 1usize;
    while i < args.len() {
        match args[i].as_str() {
            "--root" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--root requires a value".to_string())?;
                root = v.clone();
                i += 2;
            }
            "--config" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--config requires a value".to_string())?;
                config_path = Some(v.clone());
                i += 2;
            }
            "--search" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--search requires a value".to_string())?;
                query = v.clone();
                i += 2;
            }
            other if other.starts_with("--") => {
                return Err(format!("unknown option '{}'", other));
            }
            other => {
                positional.push(other.to_string());
                i += 1;
            }
        }
    }

    let command = match positional.as_slice() {
        [cmd] if cmd == "works" => Command::Works,
        [cmd] if cmd == "writings" => Command::Writings,
        [cmd, slug] if cmd == "chapters" => Command::Chapters {
            slug: slug.clone(),
            query,
        },
        [cmd, slug, code] if cmd == "chapter" => Command::Chapter {
            slug: slug.clone(),
            code: code.clone(),
        },
        [] => return Err("missing command".to_string()),
        _ => return Err(format!("invalid command '{}'", positional.join(" "))),
    };

    Ok(Args {
        root,
        config_path,
        command,
    })
}

fn help_text() -> &'static str {
    r#"titik-fiksi - inspect a Titik Fiksi content tree

USAGE:
  titik-fiksi [options] works
  titik-fiksi [options] writings
  titik-fiksi [options] chapters <novel-slug> [--search <text>]
  titik-fiksi [options] chapter <novel-slug> <code>

OPTIONS:
  --root <dir>        site root holding the content/ folder (default: .)
  --config <file>     JSON site configuration
  --search <text>     filter chapters by code or title
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use titik_fiksi::MemorySource;

    fn argv(parts: &[&str]) -> Vec<String> {
        std::iter::once("titik-fiksi")
            .chain(parts.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn parse_args_reads_options_and_command() {
        let args = parse_args(argv(&["--root", "public", "chapters", "senja", "--search", "hujan"]))
            .unwrap();
        assert_eq!(args.root, "public");
        assert_eq!(
            args.command,
            Command::Chapters {
                slug: "senja".to_string(),
                query: "hujan".to_string()
            }
        );
        assert!(parse_args(argv(&[])).is_err());
        assert!(parse_args(argv(&["chapter", "senja"])).is_err());
        assert!(parse_args(argv(&["--bogus", "works"])).is_err());
    }

    #[test]
    fn works_command_reports_missing_and_empty_catalogs() {
        let config = SiteConfig::default();
        let err = execute(&Command::Works, &MemorySource::new(), &config).unwrap_err();
        assert!(err.starts_with("resource_unavailable:"));

        let source =
            MemorySource::new().with_json(config.paths.works.clone(), json!({ "works": [] }));
        assert_eq!(execute(&Command::Works, &source, &config).unwrap(), "no novels\n");
    }

    #[test]
    fn chapter_command_prints_navigation() {
        let config = SiteConfig::default();
        let source = MemorySource::new().with_json(
            config.paths.aggregate_chapters("senja"),
            json!({ "chapters": [
                { "code": "01", "title": "Awal", "content": "Halo", "published": true },
                { "code": "02", "title": "Akhir", "content": "", "published": true }
            ] }),
        );
        let out = execute(
            &Command::Chapter {
                slug: "senja".to_string(),
                code: "01".to_string(),
            },
            &source,
            &config,
        )
        .unwrap();
        assert!(out.starts_with("# 01 Awal\nprev: -\nnext: 02\n<p>Halo</p>"));
    }

    #[test]
    fn logging_reports_warnings() {
        init_logging().unwrap();
        assert!(log::log_enabled!(log::Level::Warn));
    }
}
