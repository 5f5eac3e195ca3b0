use crate::config::ViewerConfig;
use crate::results::{Image, Link, Pagination, ScrapeResult};
use crate::view::{Panel, SubpageEntry, SubpageSection, ViewState};
use std::fmt;

/// Limits applied when rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Subpages the backend delivers per page
    pub page_size: u32,
    pub subpage_link_limit: usize,
    pub subpage_image_limit: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from(&ViewerConfig::default())
    }
}

impl From<&ViewerConfig> for RenderOptions {
    fn from(config: &ViewerConfig) -> Self {
        Self {
            page_size: config.page_size,
            subpage_link_limit: config.subpage_link_limit,
            subpage_image_limit: config.subpage_image_limit,
        }
    }
}

/// Plain-text projection of a [`ViewState`]
pub struct Screen<'a> {
    state: &'a ViewState,
    options: RenderOptions,
}

impl<'a> Screen<'a> {
    pub fn new(state: &'a ViewState, options: RenderOptions) -> Self {
        Self { state, options }
    }

    fn render_result(&self, f: &mut fmt::Formatter<'_>, result: &ScrapeResult) -> fmt::Result {
        let panels = self.state.panels();

        writeln!(f, "Title: {}", or_fallback(&result.title, "No title found"))?;
        writeln!(
            f,
            "Description: {}",
            or_fallback(&result.meta_description, "No meta description found")
        )?;

        writeln!(f)?;
        panel_header(f, "Headings", result.h1_tags.len(), panels.is_expanded(Panel::Headings))?;
        if panels.is_expanded(Panel::Headings) {
            if result.h1_tags.is_empty() {
                writeln!(f, "  No headings found")?;
            }
            for heading in &result.h1_tags {
                writeln!(f, "  - {}", heading)?;
            }
        }

        panel_header(f, "Links", result.links.len(), panels.is_expanded(Panel::Links))?;
        if panels.is_expanded(Panel::Links) {
            if result.links.is_empty() {
                writeln!(f, "  No links found")?;
            }
            for link in &result.links {
                write_link(f, "  ", link)?;
            }
        }

        panel_header(f, "Images", result.images.len(), panels.is_expanded(Panel::Images))?;
        if panels.is_expanded(Panel::Images) {
            if result.images.is_empty() {
                writeln!(f, "  No images found")?;
            }
            for image in &result.images {
                write_image(f, "  ", image)?;
            }
        }

        writeln!(
            f,
            "{} Full Text",
            marker(panels.is_expanded(Panel::FullText))
        )?;
        if panels.is_expanded(Panel::FullText) {
            write_indented(
                f,
                "  ",
                or_fallback(&result.full_text, "No text content found"),
            )?;
        }

        let items = self.state.filtered_content();
        writeln!(
            f,
            "{} All Content ({} of {})",
            marker(panels.is_expanded(Panel::AllContent)),
            items.len(),
            result.all_content.len()
        )?;
        if panels.is_expanded(Panel::AllContent) {
            if !self.state.filter().is_empty() {
                writeln!(f, "  Filter: {}", self.state.filter())?;
            }
            if result.all_content.is_empty() {
                writeln!(f, "  No content elements found")?;
            }
            for item in items {
                match item.identifiers() {
                    Some(identifiers) => writeln!(f, "  <{}> {}", item.tag, identifiers)?,
                    None => writeln!(f, "  <{}>", item.tag)?,
                }
                write_indented(f, "    ", &item.text)?;
            }
        }

        Ok(())
    }

    fn render_subpages(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subpages = self.state.subpages();
        if subpages.is_empty() {
            return Ok(());
        }

        writeln!(f)?;
        match self.state.pagination() {
            Some(pagination) if pagination.total_subpages > 0 => writeln!(
                f,
                "Subpages ({} of {})",
                pagination.loaded(self.options.page_size),
                pagination.total_subpages
            )?,
            _ => writeln!(f, "Subpages ({})", subpages.len())?,
        }

        for (index, entry) in subpages.iter().enumerate() {
            self.render_subpage(f, index, entry)?;
        }

        if let Some(pagination) = self.state.pagination().filter(|p| p.has_next) {
            self.render_pagination(f, pagination)?;
        }
        Ok(())
    }

    fn render_subpage(
        &self,
        f: &mut fmt::Formatter<'_>,
        index: usize,
        entry: &SubpageEntry,
    ) -> fmt::Result {
        let subpage = &entry.subpage;
        writeln!(f)?;
        writeln!(
            f,
            "[{}] {}",
            index,
            or_fallback(&subpage.title, "Untitled Page")
        )?;
        writeln!(f, "    {}", subpage.url)?;

        if !subpage.full_text.is_empty() {
            let open = entry.panels.get(SubpageSection::Text).is_expanded();
            writeln!(f, "    {} Text Content", marker(open))?;
            if open {
                write_indented(f, "      ", &subpage.full_text)?;
            }
        }

        if !subpage.h1_tags.is_empty() {
            writeln!(f, "    Headings")?;
            for heading in &subpage.h1_tags {
                writeln!(f, "      - {}", heading)?;
            }
        }

        if !subpage.links.is_empty() {
            let open = entry.panels.get(SubpageSection::Links).is_expanded();
            writeln!(f, "    {} Links (Found {} links)", marker(open), subpage.links.len())?;
            if open {
                let limit = self.options.subpage_link_limit;
                for link in subpage.links.iter().take(limit) {
                    write_link(f, "      ", link)?;
                }
                if subpage.links.len() > limit {
                    writeln!(f, "      ... and {} more links", subpage.links.len() - limit)?;
                }
            }
        }

        if !subpage.images.is_empty() {
            let open = entry.panels.get(SubpageSection::Images).is_expanded();
            writeln!(
                f,
                "    {} Images (Found {} images)",
                marker(open),
                subpage.images.len()
            )?;
            if open {
                let limit = self.options.subpage_image_limit;
                for image in subpage.images.iter().take(limit) {
                    write_image(f, "      ", image)?;
                }
                if subpage.images.len() > limit {
                    writeln!(
                        f,
                        "      ... and {} more images",
                        subpage.images.len() - limit
                    )?;
                }
            }
        }

        Ok(())
    }

    fn render_pagination(
        &self,
        f: &mut fmt::Formatter<'_>,
        pagination: &Pagination,
    ) -> fmt::Result {
        writeln!(f)?;
        writeln!(
            f,
            "Showing {} of {} subpages (Page {}/{})",
            pagination.loaded(self.options.page_size),
            pagination.total_subpages,
            pagination.current_page.saturating_add(1),
            pagination.total_pages
        )?;
        writeln!(f, "[Load More Subpages]")
    }
}

impl fmt::Display for Screen<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(loading) = self.state.loading() {
            writeln!(f, "... {}", loading)?;
        }
        if let Some(error) = self.state.error() {
            writeln!(f, "Error: {}", error)?;
        }
        if let Some(notice) = self.state.notice() {
            writeln!(f, "{}", notice)?;
        }

        if let Some(result) = self.state.result() {
            self.render_result(f, result)?;
            self.render_subpages(f)?;
        }
        Ok(())
    }
}

fn or_fallback<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() { fallback } else { value }
}

fn marker(expanded: bool) -> &'static str {
    if expanded { "[-]" } else { "[+]" }
}

fn panel_header(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    count: usize,
    expanded: bool,
) -> fmt::Result {
    writeln!(f, "{} {} ({})", marker(expanded), name, count)
}

fn write_link(f: &mut fmt::Formatter<'_>, indent: &str, link: &Link) -> fmt::Result {
    if link.label() == link.href {
        writeln!(f, "{}- {}", indent, link.href)
    } else {
        writeln!(f, "{}- {} <{}>", indent, link.label(), link.href)
    }
}

fn write_image(f: &mut fmt::Formatter<'_>, indent: &str, image: &Image) -> fmt::Result {
    let alt = image.alt.as_deref().unwrap_or_default();
    writeln!(f, "{}- Alt text: {}", indent, or_fallback(alt, "No alt text"))?;
    writeln!(f, "{}  Source: {}", indent, image.src)
}

fn write_indented(f: &mut fmt::Formatter<'_>, indent: &str, text: &str) -> fmt::Result {
    for line in text.lines() {
        if line.is_empty() {
            writeln!(f)?;
        } else {
            writeln!(f, "{}{}", indent, line)?;
        }
    }
    Ok(())
}
