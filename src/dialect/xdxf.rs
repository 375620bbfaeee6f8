//! XDXF lexicons: `<xdxf><lexicon><ar><k/><def>...</def></ar>...`
//!
//! Unlike the TEI transcriptions these files are well-formed XML, so they are
//! read into a small element tree with quick-xml and walked structurally.

use super::{Segment, Unit, UnitBody};
use crate::assemble::{assemble, senses_from_body, Head};
use crate::classify::classify;
use crate::error::{Rejection, Result, ScanError};
use crate::model::{CrossRef, Entry, Example, ExampleKind, Location, Relation, Sense};
use crate::normalize::{collapse_whitespace, decode_entities};
use crate::schema::Profile;
use crate::senses::SenseText;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    pub fn into_elements(self) -> impl Iterator<Item = Element> {
        self.children.into_iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements().filter(move |e| e.name == name)
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    /// All character data below this element, whitespace-collapsed.
    /// `<lb/>` and `<br/>` add nothing, so words split across them rejoin.
    pub fn text(&self) -> String {
        let mut buf = String::new();
        self.collect_text(&mut buf);
        collapse_whitespace(&buf)
    }

    fn collect_text(&self, buf: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(text) => buf.push_str(text),
                Node::Element(element) if is_line_break(&element.name) => {}
                Node::Element(element) => element.collect_text(buf),
            }
        }
    }
}

fn is_line_break(name: &str) -> bool {
    name.eq_ignore_ascii_case("lb") || name.eq_ignore_ascii_case("br")
}

// === Tree building ===

/// Parses a whole document. The returned element is a synthetic container
/// whose children are the document's top-level nodes.
pub fn parse_document(xml: &str, origin: &str) -> Result<Element> {
    let malformed = |message: String| ScanError::MalformedMarkup {
        origin: origin.to_string(),
        message,
    };

    let mut reader = Reader::from_str(xml);
    reader.config_mut().check_end_names = true;

    let mut stack = vec![Element::named("#document")];

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => stack.push(start_element(&e).map_err(malformed)?),
            Ok(Event::Empty(e)) => {
                let element = start_element(&e).map_err(malformed)?;
                push_node(&mut stack, Node::Element(element));
            }
            Ok(Event::End(e)) => {
                if stack.len() < 2 {
                    return Err(malformed(format!(
                        "unexpected </{}>",
                        String::from_utf8_lossy(e.name().as_ref())
                    )));
                }
                if let Some(element) = stack.pop() {
                    push_node(&mut stack, Node::Element(element));
                }
            }
            Ok(Event::Text(e)) => {
                let text = decode_entities(&String::from_utf8_lossy(&e));
                push_node(&mut stack, Node::Text(text));
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(&e).into_owned();
                push_node(&mut stack, Node::Text(text));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(malformed(format!(
                    "at byte {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        }
    }

    if stack.len() > 1 {
        let open = stack.last().map(|e| e.name.clone()).unwrap_or_default();
        return Err(malformed(format!("unclosed <{}> at end of input", open)));
    }
    stack
        .pop()
        .ok_or_else(|| malformed("empty document".to_string()))
}

fn start_element(e: &BytesStart) -> std::result::Result<Element, String> {
    let mut element = Element::named(&String::from_utf8_lossy(e.name().as_ref()));
    for attr in e.attributes() {
        let attr = attr.map_err(|e| format!("bad attribute: {}", e))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = match attr.unescape_value() {
            Ok(value) => value.into_owned(),
            Err(_) => decode_entities(&String::from_utf8_lossy(&attr.value)),
        };
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn push_node(stack: &mut [Element], node: Node) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

// === Splitting ===

/// Parses the document and yields one segment per `<lexicon>/<ar>`.
pub fn split<'a>(
    profile: &'a Profile,
    source: &str,
    origin: &str,
) -> Result<impl Iterator<Item = Segment> + 'a> {
    let document = parse_document(source, origin)?;

    let root = document
        .elements()
        .next()
        .ok_or_else(|| ScanError::MalformedMarkup {
            origin: origin.to_string(),
            message: "no root element".to_string(),
        })?;
    if let Some(title) = root.child("meta_info").and_then(|m| m.child("title")) {
        debug!("{}: {}", origin, title.text());
    }

    let articles: Vec<Element> = match document
        .into_elements()
        .next()
        .and_then(|root| root.into_elements().find(|e| e.name == "lexicon"))
    {
        Some(lexicon) => lexicon.into_elements().filter(|e| e.name == "ar").collect(),
        None => {
            warn!("{}: no <lexicon> element", origin);
            Vec::new()
        }
    };

    Ok(articles.into_iter().enumerate().map(move |(index, article)| {
        let record = index + 1;
        if profile.start_at.is_some_and(|start| record < start) {
            return Segment::FrontMatter;
        }
        Segment::Candidate(Unit {
            location: Location::Record(record),
            body: UnitBody::Article(article),
        })
    }))
}

// === Article parsing ===

/// Builds an entry from one `<ar>`.
///
/// Top-level `<deftext>` goes through the sense segmenter; each nested
/// `<def>` is one sense numbered by position. Examples and explanations
/// directly under the outer `<def>` are gathered into a trailing sense 0.
pub fn parse_article(
    profile: &Profile,
    article: &Element,
    location: Location,
) -> std::result::Result<Entry, Rejection> {
    let mut keys = article.children_named("k").map(Element::text);
    let headword = keys.next().ok_or(Rejection::NotAnEntry)?;
    if headword.is_empty() {
        return Err(Rejection::NotAnEntry);
    }
    let alternate_forms: Vec<String> = keys.filter(|k| !k.is_empty()).collect();

    let def = article.child("def").ok_or(Rejection::NotAnEntry)?;

    let mut senses = Vec::new();
    for deftext in def.children_named("deftext") {
        senses.extend(senses_from_body(profile, &deftext.text()));
    }
    for (index, nested) in def.children_named("def").enumerate() {
        senses.extend(nested_sense(profile, nested, index as u32 + 1));
    }
    let trailing = Sense {
        examples: examples(def),
        explanations: explanations(def),
        ..Sense::default()
    };
    if trailing.has_content() {
        senses.push(trailing);
    }

    let cross_references = def.child("sr").map(cross_references).unwrap_or_default();

    let head = Head {
        headword,
        alternate_forms,
        grammar_marker: non_empty_text(def.child("gr")),
        etymology_marker: non_empty_text(def.child("etm")),
        ..Head::default()
    };

    assemble(profile, head, senses, cross_references, location)
}

fn nested_sense(profile: &Profile, def: &Element, number: u32) -> Option<Sense> {
    let text = def
        .children_named("deftext")
        .map(Element::text)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let mut sense = classify(profile, &SenseText { number, text: &text }).unwrap_or_else(|| Sense {
        number,
        raw_text: text.clone(),
        ..Sense::default()
    });
    sense.examples = examples(def);
    sense.explanations = explanations(def);

    sense.has_content().then_some(sense)
}

fn explanations(def: &Element) -> Vec<String> {
    def.children_named("expl")
        .map(Element::text)
        .filter(|t| !t.is_empty())
        .collect()
}

fn examples(def: &Element) -> Vec<Example> {
    def.children_named("ex")
        .filter_map(|ex| {
            let text = ex.child("ex_orig")?.text();
            if text.is_empty() {
                return None;
            }
            Some(Example {
                text,
                kind: ExampleKind::from_code(ex.attribute("type").unwrap_or("exm")),
            })
        })
        .collect()
}

fn cross_references(sr: &Element) -> Vec<CrossRef> {
    sr.children_named("kref")
        .filter_map(|kref| {
            let target_word = kref.text();
            if target_word.is_empty() {
                return None;
            }
            Some(CrossRef {
                target_word,
                relation: Relation::from_code(kref.attribute("type").unwrap_or("rel")),
            })
        })
        .collect()
}

fn non_empty_text(element: Option<&Element>) -> Option<String> {
    element.map(Element::text).filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;

    fn stv() -> &'static Profile {
        Schema::builtin().unwrap().profile("stv").unwrap()
    }

    fn lexicon(articles: &str) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <xdxf lang_from=\"MAL\" lang_to=\"MAL\" format=\"logical\">\n\
             <meta_info><title>ശബ്ദതാരാവലി</title></meta_info>\n\
             <lexicon>\n{}\n</lexicon>\n</xdxf>\n",
            articles
        )
    }

    fn articles(xml: &str) -> Vec<Unit> {
        split(stv(), xml, "test.xml")
            .unwrap()
            .filter_map(|seg| match seg {
                Segment::Candidate(unit) => Some(unit),
                _ => None,
            })
            .collect()
    }

    fn parse(xml: &str) -> std::result::Result<Entry, Rejection> {
        let unit = articles(xml).remove(0);
        match &unit.body {
            UnitBody::Article(article) => parse_article(stv(), article, unit.location.clone()),
            UnitBody::Text(_) => panic!("expected an article"),
        }
    }

    #[test]
    fn text_walk_skips_line_breaks() {
        let doc = parse_document("<k>അക<lb/>ഷം <b>x</b>\n y</k>", "t").unwrap();
        let k = doc.child("k").unwrap();
        assert_eq!(k.text(), "അകഷം x y");
    }

    #[test]
    fn entities_in_text_are_decoded() {
        let doc = parse_document("<k>a &amp; b&nbsp;c</k>", "t").unwrap();
        // no-break space counts as whitespace and collapses too
        assert_eq!(doc.child("k").unwrap().text(), "a & b c");
    }

    #[test]
    fn articles_are_numbered_from_one() {
        let units = articles(&lexicon("<ar><k>അ</k><def><deftext>ഒന്ന്</deftext></def></ar>\n<ar><k>ആ</k><def><deftext>രണ്ട്</deftext></def></ar>"));
        let locations: Vec<Location> = units.iter().map(|u| u.location.clone()).collect();
        assert_eq!(locations, vec![Location::Record(1), Location::Record(2)]);
    }

    #[test]
    fn full_article() {
        let xml = lexicon(
            r#"<ar>
  <k>അമ്മ</k><k>അംബ</k>
  <def>
    <gr>n.</gr>
    <etm>സംസ്കൃതം</etm>
    <def><deftext>മാതാവ്.</deftext><ex type="prv"><ex_orig>അമ്മയെ തല്ലിയാലും രണ്ടു പക്ഷം</ex_orig></ex></def>
    <def><deftext>ദേവി.</deftext><expl>ആദരവോടെ വിളിക്കുന്നത്</expl></def>
    <sr><kref type="syn">തായ്</kref><kref type="xyz">ജനനി</kref></sr>
  </def>
</ar>"#,
        );
        let entry = parse(&xml).unwrap();

        assert_eq!(entry.headword, "അമ്മ");
        assert_eq!(entry.alternate_forms, vec!["അംബ"]);
        assert_eq!(entry.part_of_speech(), Some("noun"));
        assert_eq!(entry.etymology.as_ref().map(|m| m.raw.as_str()), Some("സംസ്കൃതം"));
        assert_eq!(entry.etymology_language(), None);

        assert_eq!(entry.senses.len(), 2);
        assert_eq!(entry.senses[0].number, 1);
        assert_eq!(entry.senses[0].target_text, "മാതാവ്");
        assert_eq!(entry.senses[0].examples[0].kind, ExampleKind::Proverb);
        assert_eq!(entry.senses[1].number, 2);
        assert_eq!(entry.senses[1].explanations, vec!["ആദരവോടെ വിളിക്കുന്നത്"]);

        assert_eq!(entry.cross_references.len(), 2);
        assert_eq!(entry.cross_references[0].relation, Relation::Synonym);
        assert_eq!(entry.cross_references[1].relation, Relation::Related);
        assert_eq!(entry.provenance.location, Location::Record(1));
    }

    #[test]
    fn top_level_deftext_is_segmented() {
        let entry = parse(&lexicon(
            "<ar><k>അക്ഷം</k><def><deftext>1. കണ്ണ്. 2. ചക്രം.</deftext></def></ar>",
        ))
        .unwrap();
        let numbers: Vec<u32> = entry.senses.iter().map(|s| s.number).collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn top_level_examples_form_a_trailing_sense() {
        let entry = parse(&lexicon(
            "<ar><k>ആന</k><def><deftext>ഒരു മൃഗം</deftext><ex><ex_orig>ആന കൊടുത്താലും</ex_orig></ex></def></ar>",
        ))
        .unwrap();
        assert_eq!(entry.senses.len(), 2);
        assert_eq!(entry.senses[1].number, 0);
        assert_eq!(entry.senses[1].examples[0].kind, ExampleKind::Usage);
    }

    #[test]
    fn missing_parts_are_not_entries() {
        assert_eq!(
            parse(&lexicon("<ar><def><deftext>ഒന്ന്</deftext></def></ar>")),
            Err(Rejection::NotAnEntry)
        );
        assert_eq!(parse(&lexicon("<ar><k>അ</k></ar>")), Err(Rejection::NotAnEntry));
        assert_eq!(
            parse(&lexicon("<ar><k> </k><def><deftext>ഒന്ന്</deftext></def></ar>")),
            Err(Rejection::NotAnEntry)
        );
    }

    #[test]
    fn article_with_nothing_attached_is_empty() {
        assert_eq!(
            parse(&lexicon("<ar><k>അ</k><def><gr>n.</gr></def></ar>")),
            Err(Rejection::EmptyEntry)
        );
    }

    #[test]
    fn malformed_document_fails_the_source() {
        let err = split(stv(), "<xdxf><lexicon><ar><k>അ</ar></lexicon></xdxf>", "bad.xml")
            .err()
            .unwrap();
        assert!(matches!(err, ScanError::MalformedMarkup { .. }));
        assert!(err.to_string().contains("bad.xml"));
    }

    #[test]
    fn unclosed_document_fails_the_source() {
        assert!(matches!(
            parse_document("<xdxf><lexicon>", "t"),
            Err(ScanError::MalformedMarkup { .. })
        ));
    }

    #[test]
    fn records_before_start_are_front_matter() {
        let profile = stv().clone().with_start_at(Some(2));
        let xml = lexicon("<ar><k>അ</k><def><deftext>ഒന്ന്</deftext></def></ar><ar><k>ആ</k><def><deftext>രണ്ട്</deftext></def></ar>");
        let segs: Vec<Segment> = split(&profile, &xml, "t").unwrap().collect();
        assert!(matches!(segs[0], Segment::FrontMatter));
        assert!(matches!(segs[1], Segment::Candidate(_)));
    }
}
