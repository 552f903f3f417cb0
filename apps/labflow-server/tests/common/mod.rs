//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use labflow_server::document::{ExtractedText, ExtractionMethod};
use labflow_server::extract::OcrTextSource;
use labflow_server::structuring::{ExamRecord, StructuringError, StructuringService};

/// Build a PDF whose pages each show the given lines in Helvetica.
///
/// A page with no lines gets an empty content stream. Offsets in the xref
/// table are exact so MuPDF opens the file without repairing it.
pub fn build_pdf(pages: &[Vec<&str>]) -> Vec<u8> {
    let page_count = pages.len();
    let mut objects: Vec<String> = Vec::new();

    objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());

    let kids: Vec<String> = (0..page_count)
        .map(|i| format!("{} 0 R", 4 + i * 2))
        .collect();
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids.join(" "),
        page_count
    ));

    objects.push("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string());

    for (i, lines) in pages.iter().enumerate() {
        let contents_id = 5 + i * 2;
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents {} 0 R /Resources << /Font << /F1 3 0 R >> >> >>",
            contents_id
        ));

        let mut content = String::new();
        if !lines.is_empty() {
            content.push_str("BT /F1 9 Tf 12 TL 40 740 Td");
            for line in lines {
                content.push_str(&format!(" ({}) Tj T*", line));
            }
            content.push_str(" ET");
        }
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            content.len(),
            content
        ));
    }

    let mut pdf = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, body));
    }

    let xref_offset = pdf.len();
    pdf.push_str(&format!("xref\n0 {}\n", objects.len() + 1));
    pdf.push_str("0000000000 65535 f \n");
    for offset in offsets {
        pdf.push_str(&format!("{:010} 00000 n \n", offset));
    }
    pdf.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_offset
    ));

    pdf.into_bytes()
}

/// Lines of a typical hemogram report, about 150 characters in total
pub fn hemogram_lines() -> Vec<&'static str> {
    vec![
        "HEMOGRAMA COMPLETO  Coleta: 03/02/2025",
        "Hemoglobina 13,5 g/dL  VR: 12,0 a 15,5",
        "Hematocrito 40,1 %  VR: 35,0 a 45,0",
        "Leucocitos 6.200 /mm3  VR: 4.000 a 11.000",
    ]
}

/// Lines of a lipid panel, about 150 characters in total
pub fn lipid_lines() -> Vec<&'static str> {
    vec![
        "PERFIL LIPIDICO  Coleta: 03/02/2025",
        "Colesterol total 182 mg/dL  VR: inferior a 190",
        "HDL colesterol 54 mg/dL  VR: superior a 40",
        "Triglicerides 97 mg/dL  VR: inferior a 150",
    ]
}

/// OCR source that records its calls and returns a fixed text
pub struct CountingOcr {
    pub text: String,
    calls: AtomicUsize,
}

impl CountingOcr {
    pub fn new(text: &str) -> Arc<Self> {
        Arc::new(Self {
            text: text.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl OcrTextSource for CountingOcr {
    fn extract_ocr(&self, _bytes: &[u8]) -> ExtractedText {
        self.calls.fetch_add(1, Ordering::SeqCst);
        ExtractedText::new(ExtractionMethod::Ocr, self.text.clone())
    }
}

/// Structuring service that returns one record per non-marker line it sees
#[derive(Default)]
pub struct LineStructurer {
    pub seen: Mutex<Vec<String>>,
}

#[async_trait]
impl StructuringService for LineStructurer {
    async fn structure(&self, raw_text: &str) -> Result<Vec<ExamRecord>, StructuringError> {
        self.seen.lock().unwrap().push(raw_text.to_string());

        Ok(raw_text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with("---"))
            .map(|line| ExamRecord {
                full_name: line.to_string(),
                ..Default::default()
            })
            .collect())
    }
}
