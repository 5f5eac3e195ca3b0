use crate::results::CrawlDepth;
use crate::view::{CopyTarget, Panel, SubpageSection};
use std::str::FromStr;

pub const HELP: &str = "\
Commands:
  submit <url> [root|subpages]   scrape a URL
  more                           load the next page of subpages
  page <n>                       load page n (0-indexed) of subpages
  all                            load every remaining page
  toggle <panel>                 headings, links, images, full-text, all-content
  toggle-sub <n> <section>       text, links or images of subpage n
  filter [text]                  filter content items (no text clears)
  copy full-text                 copy the page text
  copy <section> <n>             text, headings, links or images of subpage n
  show                           print the current view
  clear                          forget the current results
  help                           show this message
  quit                           exit";

/// A line of input in interactive mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Submit { url: String, depth: Option<CrawlDepth> },
    More,
    Page(u32),
    All,
    Toggle(Panel),
    ToggleSubpage { index: usize, section: SubpageSection },
    Filter(String),
    Copy(CopyTarget),
    Show,
    Clear,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let args: Vec<&str> = rest.split_whitespace().collect();

        match name.to_ascii_lowercase().as_str() {
            "submit" | "s" => match args.as_slice() {
                [url] => Ok(Command::Submit {
                    url: url.to_string(),
                    depth: None,
                }),
                [url, depth] => Ok(Command::Submit {
                    url: url.to_string(),
                    depth: Some(parse_depth(depth)?),
                }),
                _ => Err("usage: submit <url> [root|subpages]".to_string()),
            },
            "more" | "m" => Ok(Command::More),
            "page" => match args.as_slice() {
                [page] => page
                    .parse()
                    .map(Command::Page)
                    .map_err(|_| format!("invalid page '{}'", page)),
                _ => Err("usage: page <n>".to_string()),
            },
            "all" => Ok(Command::All),
            "toggle" | "t" => match args.as_slice() {
                [panel] => panel.parse().map(Command::Toggle),
                _ => Err("usage: toggle <panel>".to_string()),
            },
            "toggle-sub" => match args.as_slice() {
                [index, section] => Ok(Command::ToggleSubpage {
                    index: parse_index(index)?,
                    section: section.parse()?,
                }),
                _ => Err("usage: toggle-sub <n> <text|links|images>".to_string()),
            },
            "filter" | "f" => Ok(Command::Filter(rest.to_string())),
            "copy" | "c" => parse_copy(&args).map(Command::Copy),
            "show" | "" => Ok(Command::Show),
            "clear" => Ok(Command::Clear),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(format!("unknown command '{}' (try 'help')", other)),
        }
    }
}

fn parse_depth(depth: &str) -> Result<CrawlDepth, String> {
    match depth.to_ascii_lowercase().as_str() {
        "0" | "root" => Ok(CrawlDepth::RootOnly),
        "1" | "subpages" => Ok(CrawlDepth::Subpages),
        other => Err(format!("invalid crawl depth '{}'", other)),
    }
}

fn parse_index(index: &str) -> Result<usize, String> {
    index
        .parse()
        .map_err(|_| format!("invalid subpage index '{}'", index))
}

fn parse_copy(args: &[&str]) -> Result<CopyTarget, String> {
    match args {
        ["full-text"] => Ok(CopyTarget::FullText),
        [section, index] => {
            let index = parse_index(index)?;
            match section.to_ascii_lowercase().as_str() {
                "text" => Ok(CopyTarget::SubpageText(index)),
                "headings" => Ok(CopyTarget::SubpageHeadings(index)),
                "links" => Ok(CopyTarget::SubpageLinks(index)),
                "images" => Ok(CopyTarget::SubpageImages(index)),
                other => Err(format!("cannot copy '{}'", other)),
            }
        }
        _ => Err("usage: copy full-text | copy <text|headings|links|images> <n>".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit() {
        assert_eq!(
            "submit example.com".parse::<Command>(),
            Ok(Command::Submit {
                url: "example.com".to_string(),
                depth: None
            })
        );
        assert_eq!(
            "s example.com root".parse::<Command>(),
            Ok(Command::Submit {
                url: "example.com".to_string(),
                depth: Some(CrawlDepth::RootOnly)
            })
        );
        assert!("submit".parse::<Command>().is_err());
        assert!("submit example.com 2".parse::<Command>().is_err());
    }

    #[test]
    fn test_filter_keeps_rest_of_line() {
        assert_eq!(
            "filter  Contact Us ".parse::<Command>(),
            Ok(Command::Filter("Contact Us".to_string()))
        );
        assert_eq!("filter".parse::<Command>(), Ok(Command::Filter(String::new())));
    }

    #[test]
    fn test_toggles() {
        assert_eq!(
            "toggle all-content".parse::<Command>(),
            Ok(Command::Toggle(Panel::AllContent))
        );
        assert_eq!(
            "toggle-sub 3 links".parse::<Command>(),
            Ok(Command::ToggleSubpage {
                index: 3,
                section: SubpageSection::Links
            })
        );
        assert!("toggle sidebar".parse::<Command>().is_err());
    }

    #[test]
    fn test_copy_targets() {
        assert_eq!(
            "copy full-text".parse::<Command>(),
            Ok(Command::Copy(CopyTarget::FullText))
        );
        assert_eq!(
            "copy images 2".parse::<Command>(),
            Ok(Command::Copy(CopyTarget::SubpageImages(2)))
        );
        assert!("copy images x".parse::<Command>().is_err());
    }

    #[test]
    fn test_paging_and_misc() {
        assert_eq!("page 4".parse::<Command>(), Ok(Command::Page(4)));
        assert!("page -1".parse::<Command>().is_err());
        assert_eq!("more".parse::<Command>(), Ok(Command::More));
        assert_eq!("".parse::<Command>(), Ok(Command::Show));
        assert_eq!("QUIT".parse::<Command>(), Ok(Command::Quit));
        assert!("launch".parse::<Command>().is_err());
    }
}
