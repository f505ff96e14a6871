//! Full-text article retrieval and parsing.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;
use url::Url;

use crate::models::{Article, Field, FieldError, OpenArticle};
use crate::sources::{ElsevierSource, SourceError};
use crate::utils::tokenize;

/// Elements captured from the full-text XML
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum XmlField {
    OpenAccess,
    Title,
    ScopusId,
    Description,
    OriginalText,
}

impl XmlField {
    const ALL: [XmlField; 5] = [
        XmlField::OpenAccess,
        XmlField::Title,
        XmlField::ScopusId,
        XmlField::Description,
        XmlField::OriginalText,
    ];

    /// Match a qualified element name. Titles and descriptions only count in
    /// the Dublin Core namespace so section titles inside the body are ignored.
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"openaccess" => Some(XmlField::OpenAccess),
            b"dc:title" | b"title" => Some(XmlField::Title),
            b"scopus-id" => Some(XmlField::ScopusId),
            b"dc:description" | b"description" => Some(XmlField::Description),
            b"originalText" => Some(XmlField::OriginalText),
            _ => None,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Text content of each captured element; first occurrence wins
#[derive(Debug, Default)]
struct ArticleXml {
    values: [Option<String>; 5],
}

impl ArticleXml {
    fn get(&self, field: XmlField) -> Option<&str> {
        self.values[field.index()].as_deref()
    }

    fn parse(xml: &str) -> Result<Self, SourceError> {
        let mut reader = Reader::from_str(xml);

        let mut parsed = ArticleXml::default();
        // (field, nesting depth, accumulated text)
        let mut capture: Option<(XmlField, usize, String)> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => match capture.as_mut() {
                    Some((_, depth, text)) => {
                        *depth += 1;
                        if is_block(e.name().as_ref()) {
                            text.push(' ');
                        }
                    }
                    None => {
                        if let Some(field) = XmlField::from_name(e.name().as_ref()) {
                            if parsed.values[field.index()].is_none() {
                                capture = Some((field, 1, String::new()));
                            }
                        }
                    }
                },
                Event::Empty(e) => {
                    if capture.is_none() {
                        if let Some(field) = XmlField::from_name(e.name().as_ref()) {
                            parsed.values[field.index()].get_or_insert_with(String::new);
                        }
                    }
                }
                Event::Text(t) => {
                    if let Some((_, _, text)) = capture.as_mut() {
                        text.push_str(&t.unescape()?);
                    }
                }
                Event::CData(c) => {
                    if let Some((_, _, text)) = capture.as_mut() {
                        text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                    }
                }
                Event::End(e) => {
                    if let Some((field, depth, text)) = capture.as_mut() {
                        *depth -= 1;
                        if *depth == 0 {
                            let field = *field;
                            if let Some((_, _, text)) = capture.take() {
                                parsed.values[field.index()] = Some(text);
                            }
                        } else if is_block(e.name().as_ref()) {
                            text.push(' ');
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(parsed)
    }

    fn into_article(self, link: &str) -> Result<Article, SourceError> {
        let flag = self.get(XmlField::OpenAccess).ok_or_else(|| {
            SourceError::Parse(format!("{}: response has no openaccess flag", link))
        })?;

        if flag.trim() == "0" {
            return Ok(Article::Closed {
                link: link.to_string(),
            });
        }

        Ok(Article::Open(OpenArticle {
            link: link.to_string(),
            title: self
                .get(XmlField::Title)
                .map(|title| title.trim().to_string())
                .ok_or(FieldError::Missing),
            identifier: parse_identifier(self.get(XmlField::ScopusId)),
            abstract_tokens: self
                .get(XmlField::Description)
                .map(tokenize)
                .ok_or(FieldError::Missing),
            body: self
                .get(XmlField::OriginalText)
                .map(tokenize)
                .ok_or(FieldError::Missing),
        }))
    }
}

/// Elements that break a word when they open or close; inline markup
/// such as `ce:inf` or `ce:italic` joins its text to its neighbours.
fn is_block(name: &[u8]) -> bool {
    matches!(
        name,
        b"ce:para"
            | b"ce:simple-para"
            | b"ce:section"
            | b"ce:section-title"
            | b"ce:label"
            | b"ce:abstract-sec"
            | b"ce:list-item"
            | b"ce:caption"
    )
}

fn parse_identifier(raw: Option<&str>) -> Field<u64> {
    let raw = raw.ok_or(FieldError::Missing)?.trim();
    raw.parse::<u64>()
        .map_err(|_| FieldError::Parse(format!("identifier is not an integer: {:?}", raw)))
}

#[derive(Debug, Deserialize)]
struct CountEnvelope {
    #[serde(rename = "search-results")]
    results: CountResults,
}

#[derive(Debug, Deserialize)]
struct CountResults {
    #[serde(default)]
    entry: Vec<serde_json::Map<String, serde_json::Value>>,
}

/// Read `citedby-count` from the first entry of a Scopus response
fn first_cited_by_count(envelope: CountEnvelope) -> Field<u64> {
    let entry = envelope.results.entry.into_iter().next().ok_or(FieldError::Missing)?;
    let value = entry.get("citedby-count").ok_or(FieldError::Missing)?;
    match value {
        serde_json::Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| FieldError::Parse(format!("citedby-count {:?}", s))),
        serde_json::Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| FieldError::Parse(format!("citedby-count {}", n))),
        other => Err(FieldError::Parse(format!("citedby-count {}", other))),
    }
}

impl ElsevierSource {
    /// Retrieve an article's XML representation and parse it once
    pub async fn fetch_article(&self, link: &str) -> Result<Article, SourceError> {
        let url = Url::parse(link)?;
        let xml = self.get_text(url, "text/xml").await?;
        ArticleXml::parse(&xml)?.into_article(link)
    }

    /// Retrieve an article's plain-text rendition
    pub async fn fetch_plain_text(&self, link: &str) -> Result<String, SourceError> {
        let url = Url::parse(link)?;
        self.get_text(url, "text/plain").await
    }

    /// Citation count for a Scopus identifier.
    ///
    /// An unresolved identifier short-circuits to [`FieldError::Unresolved`]
    /// without a request.
    pub async fn citation_count(&self, identifier: &Field<u64>) -> Field<u64> {
        let id = match identifier {
            Ok(id) => *id,
            Err(_) => return Err(FieldError::Unresolved),
        };
        let query = format!("SCOPUS-ID({})", id);
        self.single_cited_by(&query).await
    }

    /// Run a Scopus query restricted to `citedby-count` and read the first entry
    pub(super) async fn single_cited_by(&self, query: &str) -> Field<u64> {
        let mut url = Url::parse(&self.endpoints.scopus_url)
            .map_err(|e| FieldError::Parse(format!("scopus url: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("query", query)
            .append_pair("field", "citedby-count");

        let envelope: CountEnvelope = self.get_json(url).await.map_err(|e| {
            tracing::warn!(query, error = %e, "citation count lookup failed");
            FieldError::from(e)
        })?;
        first_cited_by_count(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPEN_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<full-text-retrieval-response xmlns="http://www.elsevier.com/xml/svapi/article/dtd"
    xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:ce="http://www.elsevier.com/xml/common/dtd">
  <coredata>
    <prism:url xmlns:prism="http://prismstandard.org/namespaces/basic/2.0/">https://api.elsevier.com/content/article/pii/S1</prism:url>
    <dc:title>Foo</dc:title>
    <dc:description>
      Heart failure &amp; remodeling in <ce:italic>mice</ce:italic>.
    </dc:description>
    <openaccess>1</openaccess>
  </coredata>
  <scopus-id>123</scopus-id>
  <originalText><ce:section><ce:section-title>Introduction</ce:section-title><ce:para>Body text here.</ce:para></ce:section></originalText>
</full-text-retrieval-response>"#;

    #[test]
    fn test_parse_open_article() {
        let article = ArticleXml::parse(OPEN_XML)
            .unwrap()
            .into_article("L1")
            .unwrap();
        let Article::Open(open) = article else {
            panic!("expected open access");
        };
        assert_eq!(open.title, Ok("Foo".to_string()));
        assert_eq!(open.identifier, Ok(123));
        assert_eq!(
            open.abstract_tokens.unwrap(),
            vec!["Heart", "failure", "&", "remodeling", "in", "mice."]
        );
        assert_eq!(
            open.body.unwrap(),
            vec!["Introduction", "Body", "text", "here."]
        );
    }

    #[test]
    fn test_closed_access() {
        let xml = "<r><coredata><openaccess>0</openaccess><dc:title>T</dc:title></coredata></r>";
        let article = ArticleXml::parse(xml).unwrap().into_article("L2").unwrap();
        assert_eq!(
            article,
            Article::Closed {
                link: "L2".to_string()
            }
        );
    }

    #[test]
    fn test_any_non_zero_flag_is_open() {
        let xml = "<r><openaccess>true</openaccess></r>";
        let article = ArticleXml::parse(xml).unwrap().into_article("L").unwrap();
        assert!(article.is_open_access());
    }

    #[test]
    fn test_missing_flag_is_an_error() {
        let xml = "<r><dc:title>T</dc:title></r>";
        let result = ArticleXml::parse(xml).unwrap().into_article("L");
        assert!(matches!(result, Err(SourceError::Parse(_))));
    }

    #[test]
    fn test_missing_fields_are_reported_independently() {
        let xml = "<r><openaccess>1</openaccess><scopus-id>abc</scopus-id></r>";
        let Article::Open(open) = ArticleXml::parse(xml).unwrap().into_article("L").unwrap() else {
            panic!("expected open access");
        };
        assert_eq!(open.title, Err(FieldError::Missing));
        assert!(matches!(open.identifier, Err(FieldError::Parse(_))));
        assert_eq!(open.abstract_tokens, Err(FieldError::Missing));
        assert_eq!(open.body, Err(FieldError::Missing));
    }

    #[test]
    fn test_inline_markup_joins_words() {
        let xml = "<r><openaccess>1</openaccess><originalText><ce:para>H<ce:inf>2</ce:inf>O is \
                   <ce:italic>in</ce:italic>vivo.</ce:para></originalText></r>";
        let Article::Open(open) = ArticleXml::parse(xml).unwrap().into_article("L").unwrap() else {
            panic!("expected open access");
        };
        let body = open.body.unwrap();
        assert_eq!(body, vec!["H2O", "is", "invivo."]);
        assert_eq!(
            crate::utils::clean(&body, &crate::utils::CleanOptions::basic()),
            vec!["is", "invivo"]
        );
    }

    #[test]
    fn test_block_elements_separate_words() {
        let xml = "<r><openaccess>1</openaccess><originalText><ce:section>\
                   <ce:section-title>Methods</ce:section-title><ce:para>Cells</ce:para>\
                   <ce:para>grew</ce:para></ce:section></originalText></r>";
        let Article::Open(open) = ArticleXml::parse(xml).unwrap().into_article("L").unwrap() else {
            panic!("expected open access");
        };
        assert_eq!(open.body.unwrap(), vec!["Methods", "Cells", "grew"]);
    }

    #[test]
    fn test_section_titles_do_not_shadow_dc_title() {
        let xml = "<r><originalText><ce:title>Methods</ce:title></originalText>\
                   <openaccess>1</openaccess><dc:title>Real</dc:title></r>";
        let Article::Open(open) = ArticleXml::parse(xml).unwrap().into_article("L").unwrap() else {
            panic!("expected open access");
        };
        assert_eq!(open.title, Ok("Real".to_string()));
    }

    #[test]
    fn test_malformed_xml() {
        let result = ArticleXml::parse("<r><openaccess>1</r>");
        assert!(result.is_err());
    }

    #[test]
    fn test_first_cited_by_count() {
        let parse = |json: &str| first_cited_by_count(serde_json::from_str(json).unwrap());

        assert_eq!(
            parse(r#"{"search-results": {"entry": [{"citedby-count": "17"}]}}"#),
            Ok(17)
        );
        assert_eq!(
            parse(r#"{"search-results": {"entry": [{"citedby-count": 4}]}}"#),
            Ok(4)
        );
        assert_eq!(
            parse(r#"{"search-results": {"entry": [{"dc:title": "x"}]}}"#),
            Err(FieldError::Missing)
        );
        assert_eq!(
            parse(r#"{"search-results": {"entry": []}}"#),
            Err(FieldError::Missing)
        );
        assert!(matches!(
            parse(r#"{"search-results": {"entry": [{"citedby-count": "n/a"}]}}"#),
            Err(FieldError::Parse(_))
        ));
    }
}
