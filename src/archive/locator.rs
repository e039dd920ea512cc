//! Finds a station's archive in the HTML index page of the wind archive.
//!
//! The page is an ordinary directory listing. Only link texts are of interest, so the
//! page is scanned once, front to back, and the first link text naming the station's
//! archive wins.

use crate::archive::error::ArchiveError;
use crate::config::ArchivePatterns;
use log::debug;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    OutsideAnchor,
    InsideAnchor,
}

/// Lazily yields the text tokens found inside `<a>` elements, in document order.
///
/// The tokenizer is lenient about unbalanced tags, which directory listings are full
/// of. After the first tokenizer error the iterator is exhausted.
pub struct AnchorTexts<'a> {
    reader: Reader<&'a [u8]>,
    state: ScanState,
    finished: bool,
}

impl<'a> AnchorTexts<'a> {
    pub fn new(html: &'a str) -> Self {
        let mut reader = Reader::from_str(html);
        reader.trim_text(true);
        reader.check_end_names(false);
        Self {
            reader,
            state: ScanState::OutsideAnchor,
            finished: false,
        }
    }
}

fn is_anchor(name: &[u8]) -> bool {
    name.eq_ignore_ascii_case(b"a")
}

impl Iterator for AnchorTexts<'_> {
    type Item = Result<String, quick_xml::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            let event = match self.reader.read_event() {
                Ok(event) => event,
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            };
            match event {
                Event::Start(tag) if is_anchor(tag.name().as_ref()) => {
                    self.state = ScanState::InsideAnchor;
                }
                Event::End(tag) if is_anchor(tag.name().as_ref()) => {
                    self.state = ScanState::OutsideAnchor;
                }
                Event::Text(text) if self.state == ScanState::InsideAnchor => {
                    // Listings sometimes carry HTML-only entities such as &nbsp;
                    let text = text
                        .unescape()
                        .map(Cow::into_owned)
                        .unwrap_or_else(|_| String::from_utf8_lossy(&text).into_owned());
                    return Some(Ok(text));
                }
                Event::Eof => {
                    self.finished = true;
                    return None;
                }
                _ => {}
            }
        }
    }
}

/// Returns the archive file name of `station_id` listed in `index_html`.
///
/// # Errors
///
/// [`ArchiveError::DataFileNotFound`] when the page lists no archive for the station,
/// [`ArchiveError::IndexMarkup`] when the page cannot be tokenized.
pub fn locate_data_file(
    patterns: &ArchivePatterns,
    station_id: &str,
    index_html: &str,
) -> Result<String, ArchiveError> {
    for text in AnchorTexts::new(index_html) {
        let text = text.map_err(ArchiveError::IndexMarkup)?;
        if patterns.is_data_file_of(&text, station_id) {
            debug!("Found archive '{}' for station {}", text, station_id);
            return Ok(text.trim().to_string());
        }
    }
    Err(ArchiveError::DataFileNotFound {
        station_id: station_id.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const INDEX: &str = r#"<!DOCTYPE html>
<html>
<head><title>Index of /climate/hourly/wind/historical/</title></head>
<body>
<h1>Index of /climate/hourly/wind/historical/</h1><hr><pre><a href="../">../</a>
<a href="BESCHREIBUNG_obsgermany_climate_hourly_wind_historical_de.pdf">BESCHREIBUNG_obsgermany_climate_hourly_wind_historical_de.pdf</a>   21-Mar-2024 10:00   123456
<a href="FF_Stundenwerte_Beschreibung_Stationen.txt">FF_Stundenwerte_Beschreibung_Stationen.txt</a>   21-Mar-2024 10:00   54321
<a href="stundenwerte_FF_00003_19370101_20110331_hist.zip">stundenwerte_FF_00003_19370101_20110331_hist.zip</a>   21-Mar-2024 10:00   1002345
<a href="stundenwerte_FF_00044_20070401_20231231_hist.zip">stundenwerte_FF_00044_20070401_20231231_hist.zip</a>   21-Mar-2024 10:00   2003456
<a href="stundenwerte_FF_00044_20070401_20231231_hist_v2.zip">stundenwerte_FF_00044_20070401_20231231_hist_v2.zip</a>
</pre><hr></body>
</html>
"#;

    #[test]
    fn yields_only_link_texts() {
        let html = r#"<p>stundenwerte_FF_00003_x.zip</p><a href="x">first</a> between <A HREF="y">second &amp; more</A>"#;
        let texts: Vec<String> = AnchorTexts::new(html).map(Result::unwrap).collect();
        assert_eq!(texts, ["first", "second & more"]);
    }

    #[test]
    fn finds_station_archive() {
        let patterns = ArchivePatterns::default();
        let name = locate_data_file(&patterns, "00003", INDEX).unwrap();
        assert_eq!(name, "stundenwerte_FF_00003_19370101_20110331_hist.zip");
    }

    #[test]
    fn returns_first_match() {
        let patterns = ArchivePatterns::default();
        let name = locate_data_file(&patterns, "00044", INDEX).unwrap();
        assert_eq!(name, "stundenwerte_FF_00044_20070401_20231231_hist.zip");
    }

    #[test]
    fn missing_station_is_not_found() {
        let patterns = ArchivePatterns::default();
        let err = locate_data_file(&patterns, "00004", INDEX).unwrap_err();
        assert!(err.is_missing_source());
        assert!(matches!(err, ArchiveError::DataFileNotFound { station_id } if station_id == "00004"));
    }

    #[test]
    fn text_outside_links_is_ignored() {
        let patterns = ArchivePatterns::default();
        let html = "<pre>stundenwerte_FF_00003_19370101_20110331_hist.zip</pre>";
        assert!(matches!(
            locate_data_file(&patterns, "00003", html),
            Err(ArchiveError::DataFileNotFound { .. })
        ));
    }

    #[test]
    fn empty_page_is_not_found() {
        let patterns = ArchivePatterns::default();
        let err = locate_data_file(&patterns, "00003", "").unwrap_err();
        assert!(err.is_missing_source());
    }
}
