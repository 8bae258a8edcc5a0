use std::path::PathBuf;

use colored::Colorize;

use crate::error::Result;
use crate::news::{Article, NO_NEWS};
use crate::settings::load_settings;
use crate::sources::load_articles;
use crate::tui::wrap_text;

use super::settings_path;

pub fn run(config: Option<PathBuf>) -> Result<()> {
    let settings = load_settings(&settings_path(config))?;
    let articles = load_articles(&settings.news_path());
    println!("{}", format_news(&articles, 78));
    Ok(())
}

pub fn format_news(articles: &[Article], width: usize) -> String {
    if articles.is_empty() {
        return NO_NEWS.to_string();
    }
    let mut out = String::from("Financial News");
    for article in articles {
        out.push_str("\n\n");
        out.push_str(&article.title.bold().to_string());
        if !article.url.is_empty() {
            out.push('\n');
            out.push_str(&article.url.dimmed().to_string());
        }
        if !article.description.is_empty() {
            out.push('\n');
            out.push_str(&wrap_text(&article.description, width).0);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_news() {
        assert_eq!(format_news(&[], 80), NO_NEWS);
    }

    #[test]
    fn test_news_lists_articles() {
        let articles = vec![
            Article::new("Markets rally", "https://example.com/a", "Stocks rose sharply."),
            Article::new("Rates hold", "", ""),
        ];
        let out = format_news(&articles, 80);
        assert!(out.contains("Markets rally"));
        assert!(out.contains("https://example.com/a"));
        assert!(out.contains("Stocks rose sharply."));
        assert!(out.contains("Rates hold"));
    }
}
