// Command-line front end: crawl a course and write one output file per
// page, plus a course index.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use codelab2md::{extract_course, Course, Format, Options, PAGE_BREAK};

#[derive(Parser)]
#[command(
    name = "codelab2md",
    version,
    about = "Extracts a Google Codelabs course and saves it into various formats"
)]
struct Args {
    /// URL of the first codelab of the course
    #[arg(short, long, value_name = "URL")]
    course: String,

    /// Output directory in which to save all generated files
    #[arg(short, long, value_name = "DIR")]
    output_directory: PathBuf,

    /// The format of the output
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Md)]
    format: OutputFormat,

    /// The programming language used in the course, for code blocks whose
    /// language could not be automatically detected. Defaults to an empty
    /// string (no syntax highlighting).
    #[arg(short, long, default_value = "", value_name = "LANG")]
    language: String,

    /// Cache fetched pages in this directory and reuse them on later runs
    #[arg(long, value_name = "DIR")]
    cache_dir: Option<PathBuf>,

    /// Stop the crawl after this many pages
    #[arg(long, value_name = "N")]
    max_pages: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Textual dump of the parsed page trees
    Repr,
    /// One Markdown document per page
    Md,
    /// One HTML fragment per page
    Html,
    /// Pandoc-ready Markdown chapters
    Pandoc,
}

impl OutputFormat {
    fn render_format(self) -> Format {
        match self {
            OutputFormat::Repr => Format::Repr,
            OutputFormat::Md => Format::Markdown,
            OutputFormat::Html => Format::Html,
            OutputFormat::Pandoc => Format::Pandoc,
        }
    }

    /// File name for the page at the given crawl index. Must agree with
    /// the targets cross-page references render to.
    fn file_name(self, index: usize) -> String {
        match self {
            OutputFormat::Repr => format!("{index}.txt"),
            OutputFormat::Md => format!("{index}.md"),
            OutputFormat::Html => format!("{index}.html"),
            OutputFormat::Pandoc => format!("ch{index:03}.xhtml"),
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut options = Options::new()
        .with_default_language(args.language.clone());
    if let Some(max) = args.max_pages {
        options = options.with_max_pages(max);
    }
    if let Some(dir) = &args.cache_dir {
        options = options.with_cache_dir(dir.clone());
    }

    let course = extract_course(&args.course, &options)?;

    fs::create_dir_all(&args.output_directory)
        .with_context(|| format!("creating {}", args.output_directory.display()))?;
    for (index, page) in course.pages.iter().enumerate() {
        let content = match args.format {
            OutputFormat::Md => page.pages(Format::Markdown).join(PAGE_BREAK),
            other => page.render(other.render_format()),
        };
        let path = args.output_directory.join(args.format.file_name(index));
        fs::write(&path, content).with_context(|| format!("writing {}", path.display()))?;
    }

    let index_path = args.output_directory.join("course.md");
    fs::write(&index_path, course_index(&course, args.format))
        .with_context(|| format!("writing {}", index_path.display()))?;

    tracing::info!(
        pages = course.pages.len(),
        directory = %args.output_directory.display(),
        "course extracted"
    );
    Ok(())
}

/// Course-level index: title, identifier, and a link per page using its
/// chapter number and short title.
fn course_index(course: &Course, format: OutputFormat) -> String {
    let mut out = format!("# {}\n\nIdentifier: {}\n\n", course.title, course.id);
    for (index, page) in course.pages.iter().enumerate() {
        let label = match &page.chapter {
            Some(chapter) => format!("{chapter} {}", page.short_title),
            None => page.short_title.clone(),
        };
        out.push_str(&format!("- [{label}]({})\n", format.file_name(index)));
    }
    out
}
