use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::Result;

pub(crate) enum XmlRiverResponse {
	/// The search engine's `<response><error code="..."/></response>`
	/// shape (`spec.md` §4.6 step 4).
	Error { code: String },
	Docs(Vec<XmlRiverDoc>),
}

pub(crate) struct XmlRiverDoc {
	pub title: String,
	pub passage: String,
}

/// Parses an XML-river search response. The first child of `<response>`
/// is inspected: if it is an `<error>` element, parsing stops there and
/// the error code is returned; otherwise every `<doc>` element's
/// `<title>` and first `<passage>` are collected.
pub(crate) fn parse(xml: &str) -> Result<XmlRiverResponse> {
	let mut reader = Reader::from_str(xml);
	reader.config_mut().trim_text(true);

	let mut buf = Vec::new();
	let mut docs = Vec::new();
	let mut in_response = false;
	let mut seen_first_response_child = false;
	let mut tag_stack: Vec<String> = Vec::new();
	let mut current_title: Option<String> = None;
	let mut current_passage: Option<String> = None;

	loop {
		let event = reader.read_event_into(&mut buf)?;
		match event {
			Event::Eof => break,
			Event::Start(ref e) | Event::Empty(ref e) => {
				let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
				let is_empty = matches!(event, Event::Empty(_));

				if name == "response" {
					in_response = true;
					seen_first_response_child = false;
					buf.clear();
					continue;
				}

				if !in_response {
					buf.clear();
					continue;
				}

				if !seen_first_response_child {
					seen_first_response_child = true;
					if name == "error" {
						let code = e
							.attributes()
							.filter_map(|attr| attr.ok())
							.find(|attr| attr.key.as_ref() == b"code")
							.map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
							.unwrap_or_default();
						return Ok(XmlRiverResponse::Error { code });
					}
				}

				if name == "doc" {
					current_title = None;
					current_passage = None;
				}

				if !is_empty {
					tag_stack.push(name);
				}
			}
			Event::Text(ref e) => {
				let text = e.unescape().unwrap_or_default().into_owned();
				match tag_stack.last().map(String::as_str) {
					Some("title") if current_title.is_none() => current_title = Some(text),
					Some("passage") if current_passage.is_none() => current_passage = Some(text),
					_ => {}
				}
			}
			Event::End(ref e) => {
				let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
				if in_response {
					if name == "doc" {
						docs.push(XmlRiverDoc {
							title: current_title.take().unwrap_or_default(),
							passage: current_passage.take().unwrap_or_default(),
						});
					}
					tag_stack.pop();
					if name == "response" {
						in_response = false;
					}
				}
			}
			_ => {}
		}
		buf.clear();
	}

	Ok(XmlRiverResponse::Docs(docs))
}
