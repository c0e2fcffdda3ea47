//! GML reader.
//!
//! The file is parsed into a key/value tree first; the `graph` block is then
//! walked for `node` and `edge` entries. Node keys other than `id` become
//! attribute columns; nested lists such as `graphics` are ignored.

use std::fs;
use std::path::Path;

use log::{debug, warn};
use nom::{
	IResult,
	branch::alt,
	bytes::complete::{is_not, take_while},
	character::complete::{char, multispace1, satisfy},
	combinator::{all_consuming, cut, map, map_res, opt, recognize, value},
	error::{VerboseError, context, convert_error},
	multi::many0,
	number::complete::recognize_float,
	sequence::{delimited, pair, preceded, terminated},
};

use crate::error::{DiagramError, Result};
use crate::graph::{AttrValue, Graph};

type Res<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

#[derive(Clone, Debug, PartialEq)]
enum GmlValue {
	Number(f64),
	Text(String),
	List(Vec<(String, GmlValue)>),
}

impl GmlValue {
	fn scalar(&self) -> Option<AttrValue> {
		match self {
			Self::Number(n) => Some(AttrValue::Number(*n)),
			Self::Text(s) => Some(AttrValue::Text(s.clone())),
			Self::List(_) => None,
		}
	}
}

fn comment(input: &str) -> Res<'_, ()> {
	value((), pair(char('#'), take_while(|c| c != '\n')))(input)
}

fn ws(input: &str) -> Res<'_, ()> {
	value((), many0(alt((value((), multispace1), comment))))(input)
}

fn key(input: &str) -> Res<'_, &str> {
	recognize(pair(
		satisfy(|c| c.is_ascii_alphabetic() || c == '_'),
		take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
	))(input)
}

fn number(input: &str) -> Res<'_, f64> {
	map_res(recognize_float, |s: &str| s.parse::<f64>())(input)
}

fn string(input: &str) -> Res<'_, String> {
	map(
		delimited(
			char('"'),
			opt(is_not("\"")),
			cut(context("closing quote", char('"'))),
		),
		|s: Option<&str>| decode_entities(s.unwrap_or_default()),
	)(input)
}

fn gml_value(input: &str) -> Res<'_, GmlValue> {
	context(
		"value",
		alt((
			map(number, GmlValue::Number),
			map(string, GmlValue::Text),
			map(
				delimited(
					char('['),
					entries,
					preceded(ws, cut(context("closing bracket", char(']')))),
				),
				GmlValue::List,
			),
		)),
	)(input)
}

fn entries(input: &str) -> Res<'_, Vec<(String, GmlValue)>> {
	many0(preceded(
		ws,
		pair(map(key, String::from), preceded(ws, cut(gml_value))),
	))(input)
}

fn document(input: &str) -> std::result::Result<Vec<(String, GmlValue)>, String> {
	match all_consuming(terminated(entries, ws))(input) {
		Ok((_, entries)) => Ok(entries),
		Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(convert_error(input, e)),
		Err(nom::Err::Incomplete(_)) => Err("incomplete input".to_string()),
	}
}

fn decode_entities(raw: &str) -> String {
	if !raw.contains('&') {
		return raw.to_string();
	}
	raw.replace("&quot;", "\"")
		.replace("&lt;", "<")
		.replace("&gt;", ">")
		.replace("&apos;", "'")
		.replace("&amp;", "&")
}

fn field<'a>(entries: &'a [(String, GmlValue)], name: &str) -> Option<&'a GmlValue> {
	entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
}

fn id_text(value: &GmlValue) -> Option<String> {
	value.scalar().map(|v| v.as_text().into_owned())
}

/// Parses GML text into a graph.
pub fn parse_gml(text: &str) -> std::result::Result<Graph, String> {
	let top = document(text)?;
	let Some(GmlValue::List(body)) = field(&top, "graph") else {
		return Err("no graph block found".to_string());
	};

	let mut graph = Graph::new();
	for (kind, entry) in body {
		let (kind, GmlValue::List(fields)) = (kind.as_str(), entry) else {
			continue;
		};
		if kind != "node" {
			continue;
		}
		let id = field(fields, "id")
			.and_then(id_text)
			.ok_or_else(|| "node without id".to_string())?;
		let idx = graph.add_node(id);
		for (name, value) in fields {
			if name == "id" {
				continue;
			}
			if let Some(attr) = value.scalar() {
				graph.set_attr(idx, name, attr);
			}
		}
	}

	let mut skipped = 0usize;
	for (kind, entry) in body {
		let ("edge", GmlValue::List(fields)) = (kind.as_str(), entry) else {
			continue;
		};
		let endpoint = |name: &str| {
			field(fields, name)
				.and_then(id_text)
				.ok_or_else(|| format!("edge without {name}"))
		};
		let (source, target) = (endpoint("source")?, endpoint("target")?);
		let weight = match field(fields, "weight") {
			Some(GmlValue::Number(w)) => *w,
			_ => 1.0,
		};
		match (graph.node_index(&source), graph.node_index(&target)) {
			(Some(s), Some(t)) => {
				graph.add_edge(s, t, weight);
			}
			_ => {
				debug!("edge {source} -> {target} references an unknown node");
				skipped += 1;
			}
		}
	}
	if skipped > 0 {
		warn!("skipped {skipped} edges with unknown endpoints");
	}
	Ok(graph)
}

/// Reads and parses a GML file.
pub fn read_gml(path: &Path) -> Result<Graph> {
	let text = fs::read_to_string(path)?;
	parse_gml(&text).map_err(|message| DiagramError::import(path, message))
}
