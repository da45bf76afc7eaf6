// Copyright 2023 Remi Bernotavicius

use crate::shopping::ShoppingListItem;
use std::io;

pub const HEADER: [&str; 2] = ["Ingrédient", "Quantité"];

pub fn write_csv(sink: impl io::Write, items: &[ShoppingListItem]) -> ::csv::Result<()> {
    let mut writer = ::csv::WriterBuilder::new()
        .terminator(::csv::Terminator::CRLF)
        .from_writer(sink);
    writer.write_record(HEADER)?;
    for item in items {
        writer.write_record([&item.name, &item.quantities])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn to_csv(items: &[ShoppingListItem]) -> crate::Result<String> {
    let mut buffer = vec![];
    write_csv(&mut buffer, items)?;
    Ok(String::from_utf8(buffer)?)
}

#[cfg(test)]
fn read_back(text: &str) -> (Vec<String>, Vec<(String, String)>) {
    let mut reader = ::csv::Reader::from_reader(text.as_bytes());
    let header = reader.headers().unwrap().iter().map(String::from).collect();
    let rows = reader
        .records()
        .map(|r| {
            let r = r.unwrap();
            (r[0].to_owned(), r[1].to_owned())
        })
        .collect();
    (header, rows)
}

#[test]
fn csv_header_only_when_empty() {
    let text = to_csv(&[]).unwrap();
    assert_eq!(text, "Ingrédient,Quantité\r\n");
}

#[test]
fn csv_round_trip() {
    let items = vec![
        ShoppingListItem {
            name: "Farine".into(),
            quantities: "200g, 1/2 cup".into(),
        },
        ShoppingListItem {
            name: "Oeufs".into(),
            quantities: "4".into(),
        },
        ShoppingListItem {
            name: "Sauce \"maison\"".into(),
            quantities: "1 pot\n(grand)".into(),
        },
    ];
    let text = to_csv(&items).unwrap();
    assert!(text.contains("\"200g, 1/2 cup\""));

    let (header, rows) = read_back(&text);
    assert_eq!(header, HEADER);
    let expected: Vec<_> = items
        .into_iter()
        .map(|i| (i.name, i.quantities))
        .collect();
    assert_eq!(rows, expected);
}
