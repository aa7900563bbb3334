//! `ureq`-backed page source
//!
//! Discovery reads the `<img>` tags of the statically served song page;
//! pages that are only injected by client-side scripts aren't visible here.

use super::{DiscoveredPage, PageSource};
use crate::download::RunConfig;
use crate::error::FetchError;
use crate::model::SongReference;
use crate::organize::filename::{instrument_or_unknown, is_page_image, page_number};
use std::fs::{self, File};
use std::io;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use url::Url;

/// Page source speaking plain HTTP(S)
pub struct HttpPageSource {
    http_client: ureq::Agent,
    probe_client: ureq::Agent,
}

impl HttpPageSource {
    pub fn new(config: &RunConfig) -> Self {
        let http_client = ureq::AgentBuilder::new()
            .timeout(config.http_timeout)
            .user_agent(&config.user_agent)
            .build();
        let probe_client = ureq::AgentBuilder::new()
            .timeout(config.probe_timeout)
            .user_agent(&config.user_agent)
            .build();

        Self {
            http_client,
            probe_client,
        }
    }

    /// Final URL and status after following redirects, falling back to GET
    /// when the server refuses HEAD
    fn probe(&self, url: &str) -> Result<(String, u16), ureq::Error> {
        let response = match self.probe_client.head(url).call() {
            Err(ureq::Error::Status(405, _)) => self.probe_client.get(url).call(),
            other => other,
        };

        match response {
            Ok(response) => Ok((response.get_url().to_string(), response.status())),
            Err(ureq::Error::Status(code, response)) => Ok((response.get_url().to_string(), code)),
            Err(e) => Err(e),
        }
    }
}

impl PageSource for HttpPageSource {
    fn leads_to_site_root(&self, reference: &SongReference) -> bool {
        let original_path = Url::parse(reference.source_url())
            .map(|url| url.path().to_string())
            .unwrap_or_default();
        if original_path.is_empty() || original_path == "/" {
            return false;
        }

        match self.probe(reference.source_url()) {
            Ok((final_url, status)) => {
                let final_path = Url::parse(&final_url)
                    .map(|url| url.path().to_string())
                    .unwrap_or_default();
                log::debug!("Probe {} -> {} ({})", reference.source_url(), final_url, status);
                status == 404 || final_path.is_empty() || final_path == "/"
            }
            Err(e) => {
                // Can't tell; let the download step surface the problem
                log::warn!("Could not probe {}: {}", reference.source_url(), e);
                false
            }
        }
    }

    fn discover_pages(&self, reference: &SongReference) -> Result<Vec<DiscoveredPage>, FetchError> {
        let target = reference.to_string();
        let base = Url::parse(reference.source_url())
            .map_err(|e| FetchError::download(&target, e.to_string()))?;

        let html = self
            .http_client
            .get(reference.source_url())
            .call()
            .map_err(|e| FetchError::download(&target, e.to_string()))?
            .into_string()
            .map_err(|e| FetchError::download(&target, e.to_string()))?;

        let mut pages: Vec<DiscoveredPage> = Vec::new();
        for source in extract_image_sources(&html) {
            let Ok(url) = base.join(&source) else {
                log::debug!("Ignoring unparsable image source {:?}", source);
                continue;
            };
            let Some(file_name) = url
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .map(str::to_string)
            else {
                continue;
            };

            if !is_page_image(Path::new(&file_name)) || page_number(&file_name).is_none() {
                continue;
            }
            if pages.iter().any(|page| page.file_name == file_name) {
                continue;
            }

            pages.push(DiscoveredPage {
                instrument: instrument_or_unknown(&file_name),
                file_name,
                url: url.to_string(),
            });
        }

        if pages.is_empty() {
            return Err(FetchError::download(target, "no preview images found on page"));
        }

        log::info!("Discovered {} preview page(s) for {}", pages.len(), reference);
        Ok(pages)
    }

    fn fetch(&self, page: &DiscoveredPage, destination: &Path) -> Result<(), FetchError> {
        if destination.exists() {
            log::debug!("Already downloaded: {:?}", destination);
            return Ok(());
        }

        let response = self
            .http_client
            .get(&page.url)
            .call()
            .map_err(|e| FetchError::download(&page.url, e.to_string()))?;

        let content_type = response.content_type().to_string();
        if !content_type.to_ascii_lowercase().contains("image") {
            return Err(FetchError::download(
                &page.url,
                format!("unexpected content type '{}'", content_type),
            ));
        }

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|e| FetchError::filesystem(parent, e))?;
        }

        let mut part = destination.as_os_str().to_owned();
        part.push(".part");
        let part = PathBuf::from(part);

        let mut file = File::create(&part).map_err(|e| FetchError::filesystem(&part, e))?;
        if let Err(e) = io::copy(&mut response.into_reader(), &mut file) {
            let _ = fs::remove_file(&part);
            return Err(FetchError::download(&page.url, e.to_string()));
        }
        drop(file);

        fs::rename(&part, destination).map_err(|e| FetchError::filesystem(destination, e))?;
        log::info!("Downloaded {}", page.file_name);
        Ok(())
    }
}

/// One `<img ...>` tag; an unterminated tag runs to the end of the text
static IMG_TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<img\b[^>]*(?:>|$)").expect("valid img tag pattern"));

/// Quoted `src` attribute, not `data-src` and the like
static SRC_ATTRIBUTE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\ssrc\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid src pattern")
});

/// Character references that show up in attribute values
static ENTITY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:amp|quot|apos|lt|gt|#[0-9]+|#[xX][0-9a-fA-F]+);").expect("valid entity pattern")
});

/// `src` attribute values of all `<img>` tags, in document order
pub fn extract_image_sources(html: &str) -> Vec<String> {
    IMG_TAG_PATTERN
        .find_iter(html)
        .filter_map(|tag| SRC_ATTRIBUTE_PATTERN.captures(tag.as_str()))
        .filter_map(|captures| captures.get(1).or_else(|| captures.get(2)))
        .map(|value| decode_entities(value.as_str()))
        .collect()
}

/// Decode the character references of an attribute value
///
/// Unknown or out-of-range references are kept as written.
fn decode_entities(value: &str) -> String {
    ENTITY_PATTERN
        .replace_all(value, |captures: &regex::Captures| {
            let entity = &captures[0];
            let decoded = match entity {
                "&amp;" => Some('&'),
                "&quot;" => Some('"'),
                "&apos;" => Some('\''),
                "&lt;" => Some('<'),
                "&gt;" => Some('>'),
                _ => {
                    let digits = &entity[2..entity.len() - 1];
                    let code = match digits.strip_prefix(['x', 'X']) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => digits.parse().ok(),
                    };
                    code.and_then(char::from_u32)
                }
            };
            decoded.map_or_else(|| entity.to_string(), String::from)
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_image_sources() {
        let html = r#"
            <div class="sheet-wrapper"><IMG class="x" SRC="https://cdn.example.com/p/way_Flute_All_001.png?v=2"></div>
            <img data-src="/lazy.png" src='/previews/way_Flute_All_002.png'>
            <img alt="logo">
        "#;

        assert_eq!(
            extract_image_sources(html),
            vec![
                "https://cdn.example.com/p/way_Flute_All_001.png?v=2".to_string(),
                "/previews/way_Flute_All_002.png".to_string(),
            ]
        );
    }

    #[test]
    fn test_extract_handles_unterminated_tag() {
        assert_eq!(extract_image_sources("<img src=\"a.png\""), vec!["a.png".to_string()]);
        assert!(extract_image_sources("<img src=unquoted.png>").is_empty());
    }

    #[test]
    fn test_extract_decodes_entities_in_query_strings() {
        let html = r#"<img src="https://cdn.x/a_Flute_All_001.png?w=1&amp;h=2">"#;
        assert_eq!(
            extract_image_sources(html),
            vec!["https://cdn.x/a_Flute_All_001.png?w=1&h=2".to_string()]
        );
    }

    #[test]
    fn test_extract_allows_spaces_around_equals() {
        let html = "<img\n  alt=\"page\"\n  src = \"/p/b_Cello_A_002.png\" />";
        assert_eq!(extract_image_sources(html), vec!["/p/b_Cello_A_002.png".to_string()]);
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a&amp;b&#38;c&#x26;d"), "a&b&c&d");
        assert_eq!(decode_entities("&nbsp;&#xZZ;"), "&nbsp;&#xZZ;");
        assert_eq!(decode_entities("&#99999999;"), "&#99999999;");
    }
}
