use crate::models::{ReconstructedWord, SubTokenPrediction};

/// Structural tokens of the classifier's tokenizer.
const SENTINEL_TOKENS: [&str; 3] = ["<s>", "</s>", "<pad>"];
/// Byte-level BPE marker for a token that follows a space.
const WORD_START_MARKER: char = 'Ġ';

/// Merges sub-word pieces back into whole words.
///
/// A word takes label, confidence and vertical extent from its first piece;
/// continuation pieces only append text and push the right edge outward.
/// Words come out in classifier emission order.
pub fn reconstruct_words(predictions: &[SubTokenPrediction]) -> Vec<ReconstructedWord> {
    let mut words = Vec::new();
    let mut current: Option<ReconstructedWord> = None;

    for piece in predictions {
        let raw = piece.subtoken_text.as_str();
        if SENTINEL_TOKENS.contains(&raw) {
            continue;
        }

        let starts_word = raw.starts_with(WORD_START_MARKER) || raw.starts_with(' ');
        let text = raw.replace(WORD_START_MARKER, "");
        let text = text.trim();
        if text.is_empty() {
            continue;
        }

        match current.as_mut() {
            Some(word) if !starts_word => {
                word.text.push_str(text);
                word.bbox.x2 = word.bbox.x2.max(piece.bbox.x2);
            }
            _ => {
                if let Some(done) = current.take() {
                    words.push(done);
                }
                current = Some(ReconstructedWord {
                    text: text.to_string(),
                    label: piece.predicted_label,
                    confidence: piece.confidence,
                    bbox: piece.bbox,
                });
            }
        }
    }

    if let Some(done) = current {
        words.push(done);
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldLabel, NormalizedBox};

    fn piece(text: &str, label: FieldLabel, confidence: f32, x1: i32, x2: i32) -> SubTokenPrediction {
        SubTokenPrediction {
            subtoken_text: text.to_string(),
            predicted_label: label,
            confidence,
            bbox: NormalizedBox { x1, y1: 100, x2, y2: 120 },
        }
    }

    #[test]
    fn test_continuations_join_first_piece() {
        let stream = vec![
            piece("<s>", FieldLabel::Outside, 0.99, 0, 0),
            piece("ĠAC", FieldLabel::IssuerName, 0.8, 10, 30),
            piece("ME", FieldLabel::RecipientName, 0.3, 10, 45),
            piece("ĠLTDA", FieldLabel::IssuerName, 0.7, 50, 90),
            piece("</s>", FieldLabel::Outside, 0.99, 0, 0),
            piece("<pad>", FieldLabel::Outside, 0.99, 0, 0),
        ];

        let words = reconstruct_words(&stream);
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].text, "ACME");
        assert_eq!(words[0].label, FieldLabel::IssuerName);
        assert_eq!(words[0].confidence, 0.8);
        assert_eq!(words[0].bbox, NormalizedBox { x1: 10, y1: 100, x2: 45, y2: 120 });
        assert_eq!(words[1].text, "LTDA");
    }

    #[test]
    fn test_right_edge_never_shrinks() {
        let stream = vec![
            piece("Ġ1234", FieldLabel::AccessKey, 0.9, 100, 200),
            piece("56", FieldLabel::AccessKey, 0.9, 100, 150),
        ];
        let words = reconstruct_words(&stream);
        assert_eq!(words[0].text, "123456");
        assert_eq!(words[0].bbox.x2, 200);
    }

    #[test]
    fn test_leading_continuation_opens_word() {
        let stream = vec![
            piece("NF", FieldLabel::InvoiceNumber, 0.6, 0, 10),
            piece("-e", FieldLabel::InvoiceNumber, 0.6, 0, 20),
            piece(" 001", FieldLabel::InvoiceSeries, 0.9, 30, 40),
        ];
        let words = reconstruct_words(&stream);
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].text, "NF-e");
        assert_eq!(words[1].text, "001");
        assert_eq!(words[1].label, FieldLabel::InvoiceSeries);
    }

    #[test]
    fn test_empty_pieces_discarded() {
        let stream = vec![
            piece("Ġ", FieldLabel::Outside, 0.5, 0, 5),
            piece("ĠR$", FieldLabel::TotalValue, 0.4, 10, 20),
            piece("Ġ", FieldLabel::Outside, 0.5, 21, 25),
            piece("10,00", FieldLabel::TotalValue, 0.4, 26, 40),
        ];
        let words = reconstruct_words(&stream);
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].text, "R$10,00");
        assert_eq!(words[0].bbox.x2, 40);
    }

    #[test]
    fn test_empty_stream() {
        assert!(reconstruct_words(&[]).is_empty());
    }
}
