//! Basic classification example showing the record for common content shapes

use content_classifier::Classifier;

fn main() {
    println!("=== Content Classifier - Basic Examples ===\n");

    let classifier = Classifier::new();

    let samples: [(&str, &[u8], &str); 6] = [
        (
            "DITA concept with DOCTYPE",
            b"<?xml version=\"1.0\"?>\n<!DOCTYPE concept PUBLIC \"-//OASIS//DTD DITA Concept//EN\" \"concept.dtd\">\n<concept id=\"c\"/>",
            ".dita",
        ),
        (
            "HTML5 page",
            b"<!DOCTYPE html><html><body><p>Hi</p></body></html>",
            ".html",
        ),
        ("Markdown with front matter", b"---\ntitle: Foo\n---\n# Hello\n", ".md"),
        ("DTD fragment", b"<!ELEMENT foo (bar)>", ".dtd"),
        (
            "JPEG image",
            b"\xFF\xD8\xFF\xE0\x00\x10JFIF\x00\x01\x01\x00\x00\x01\x00\x01\x00\x00",
            ".jpg",
        ),
        ("XML declaration without a root", b"<?xml version=\"1.0\"?>\n", ".xml"),
    ];

    for (index, (title, content, ext)) in samples.iter().enumerate() {
        println!("Example {}: {}", index + 1, title);
        println!("Extension: {ext}");

        let result = classifier.classify(content, ext);
        let record = &result.record;
        println!("MType:     {}", record.mtype_string());
        println!("MIME:      {} (sniffed {})", record.mime_type, record.mime_type_as_sniffed);
        println!("Outcome:   {:?}", record.outcome);
        if let Some(error) = &result.error {
            let kind = if result.is_terminal() { "terminal" } else { "warning" };
            println!("Error:     [{kind}] {error}");
        }
        if let Some(split) = &record.meta_text_split
            && split.has_meta()
        {
            println!("Metadata:  {:?}", split.meta_properties);
        }
        println!("---\n");
    }

    let result = classifier.classify(b"---\ntitle: Foo\n---\n# Hello\n", ".md");
    println!("Full record as JSON:");
    println!("{}", result.record.to_json().expect("record serializes"));
}
