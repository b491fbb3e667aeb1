use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::tree::{document, Element};
use crate::parse::Canteen;

/// Serialises `root` as an UTF-8 document with a declaration and two space indentation.
pub fn render(root: &Element) -> quick_xml::Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write_element(&mut writer, root)?;
    let mut out = writer.into_inner();
    out.push(b'\n');
    Ok(out)
}

/// The full feed document of `canteen`.
pub fn to_xml(canteen: &Canteen) -> quick_xml::Result<Vec<u8>> {
    render(&document(canteen))
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> quick_xml::Result<()> {
    let start = BytesStart::new(element.name).with_attributes(
        element
            .attributes
            .iter()
            .map(|(name, value)| (*name, value.as_str())),
    );
    if element.text.is_none() && element.children.is_empty() {
        return writer.write_event(Event::Empty(start));
    }
    writer.write_event(Event::Start(start))?;
    if let Some(text) = &element.text {
        writer.write_event(Event::Text(BytesText::new(text)))?;
    }
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.name)))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use quick_xml::Reader;

    use super::*;
    use crate::parse::{Category, Day, Feed, FeedSchedule, Location, Meal, Price, Role, Times};

    /// Owned mirror of [`Element`] to compare against a parsed document.
    #[derive(Debug, PartialEq, Eq)]
    struct Node {
        name: String,
        attributes: Vec<(String, String)>,
        text: Option<String>,
        children: Vec<Node>,
    }

    impl From<&Element> for Node {
        fn from(element: &Element) -> Self {
            Self {
                name: element.name.to_owned(),
                attributes: element
                    .attributes
                    .iter()
                    .map(|(n, v)| ((*n).to_owned(), v.clone()))
                    .collect(),
                text: element.text.clone(),
                children: element.children.iter().map(Self::from).collect(),
            }
        }
    }

    fn node(start: &BytesStart<'_>) -> Node {
        Node {
            name: String::from_utf8(start.name().as_ref().to_vec()).unwrap(),
            attributes: start
                .attributes()
                .map(|a| {
                    let a = a.unwrap();
                    (
                        String::from_utf8(a.key.as_ref().to_vec()).unwrap(),
                        a.unescape_value().unwrap().into_owned(),
                    )
                })
                .collect(),
            text: None,
            children: vec![],
        }
    }

    fn parse(xml: &str) -> Node {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);
        let mut stack: Vec<Node> = vec![];
        loop {
            match reader.read_event().unwrap() {
                Event::Decl(_) => {}
                Event::Start(e) => stack.push(node(&e)),
                Event::Empty(e) => {
                    let leaf = node(&e);
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(leaf),
                        None => return leaf,
                    }
                }
                Event::Text(e) => {
                    stack.last_mut().unwrap().text = Some(e.unescape().unwrap().into_owned());
                }
                Event::End(_) => {
                    let done = stack.pop().unwrap();
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(done),
                        None => return done,
                    }
                }
                e => panic!("unexpected event {e:?}"),
            }
        }
    }

    fn canteen() -> Canteen {
        let mut times = Times::new();
        times.set_range(0, 4, "11:00-14:30").unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 4, 8).unwrap();
        Canteen {
            name: "Mensa TU Hardenbergstraße".into(),
            address: "Hardenbergstraße 34, 10623 Berlin".into(),
            city: "Berlin".into(),
            phone: "030 939 39 7439".into(),
            email: String::new(),
            location: Some(Location {
                latitude: "52.509440".into(),
                longitude: "13.326090".into(),
            }),
            times: Some(times),
            availability: Some("public".into()),
            feeds: vec![Feed {
                name: "full".into(),
                schedule: Some(FeedSchedule {
                    hour: "8".into(),
                    retry: Some("45 3 1440".into()),
                }),
                url: "https://feeds.example/321/full.xml?a=1&b=2".into(),
                source: Some("https://www.stw.berlin/mensen/mensa-tu.html".into()),
            }],
            days: vec![
                Day::closed(date.pred_opt().unwrap()),
                Day {
                    date,
                    categories: vec![Category::new(
                        "Essen",
                        vec![Meal {
                            name: "Pasta <al forno> & Salat".into(),
                            prices: vec![
                                Price::new("2,45", Role::Student),
                                Price::new("4,10", Role::Employee),
                                Price::new("5,30", Role::Other),
                            ],
                            notes: vec!["vegetarisch".into(), "Zusatzstoffe: \"2\"".into()],
                        }],
                    )],
                },
            ],
        }
    }

    #[test]
    fn test_render_document() {
        let xml = String::from_utf8(to_xml(&canteen()).unwrap()).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<openmensa version=\"2.1\""));
        assert!(xml.ends_with("</openmensa>\n"));
        assert!(xml.contains("\n  <canteen>\n    <name>Mensa TU Hardenbergstraße</name>\n"));
        assert!(xml.contains("<day date=\"2024-04-07\">\n      <closed/>\n    </day>"));
        assert!(xml.contains("<price role=\"student\">2.45</price>"));
        assert!(xml.contains("<sunday closed=\"true\"/>"));
        assert!(!xml.contains("<email"));
    }

    #[test]
    fn test_round_trip() {
        let tree = document(&canteen());
        let xml = String::from_utf8(render(&tree).unwrap()).unwrap();
        assert_eq!(parse(&xml), Node::from(&tree));
    }

    #[test]
    fn test_idempotent() {
        let canteen = canteen();
        assert_eq!(to_xml(&canteen).unwrap(), to_xml(&canteen).unwrap());
    }
}
