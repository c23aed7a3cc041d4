use pretty_assertions::assert_eq;

use ncreport_model::{
    Alignment, Color, Fill, Font, GridDocument, HorizontalAlignment, Range, ReportBook, Style,
    REPORT_COLS,
};

fn banner_style() -> Style {
    Style {
        font: Some(Font {
            size_100pt: Some(1300),
            bold: true,
            color: Some(Color::white()),
        }),
        fill: Some(Fill {
            background: Some(Color::from_rgb(0x1F3864)),
        }),
        alignment: Some(Alignment {
            horizontal: Some(HorizontalAlignment::Center),
            ..Alignment::default()
        }),
    }
}

#[test]
fn document_json_roundtrip_is_stable() {
    let mut doc = GridDocument::new("Main", REPORT_COLS);
    doc.write_styled(Range::from_a1("G1:H2").unwrap(), "Open", banner_style());
    doc.set_row_height(2, 10.0);

    let json = serde_json::to_string(&doc).expect("serialize document");
    let back: GridDocument = serde_json::from_str(&json).expect("deserialize document");
    assert_eq!(back, doc);

    // The interned style must survive the round trip at the same id.
    let id = back.regions[0].style_id;
    assert_eq!(back.styles.get(id), doc.styles.get(id));
}

#[test]
fn color_serde_uses_hex_form() {
    let json = serde_json::to_value(Color::from_rgb(0x71AF84)).unwrap();
    assert_eq!(json, serde_json::json!("#FF71AF84"));
    let back: Color = serde_json::from_value(json).unwrap();
    assert_eq!(back, Color::from_rgb(0x71AF84));
}

#[test]
fn book_replace_regenerates_rather_than_appends() {
    let mut book = ReportBook::new();
    {
        let doc = book.replace("Main", REPORT_COLS);
        doc.write(Range::from_a1("A1:H1").unwrap(), "first run", 0);
        doc.write(Range::from_a1("A2:H2").unwrap(), "stale", 0);
    }
    {
        let doc = book.replace("Main", REPORT_COLS);
        doc.write(Range::from_a1("A1:H1").unwrap(), "second run", 0);
    }

    let doc = book.document("Main").expect("document exists");
    assert_eq!(doc.regions.len(), 1);
    assert_eq!(doc.regions[0].text, "second run");
    assert_eq!(book.documents.len(), 1);
}

#[test]
fn default_style_table_deserializes_from_empty_styles() {
    let doc: GridDocument =
        serde_json::from_str(r#"{"name":"Main","columns":8,"regions":[],"styles":{"styles":[]}}"#)
            .expect("deserialize");
    assert_eq!(doc.styles.len(), 1);
    assert_eq!(doc.styles.get(0), Some(&Style::default()));
}
