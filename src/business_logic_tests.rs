#[cfg(test)]
mod tests {
    use crate::classifier::{select_prediction, softmax, ClassScore};
    use crate::db::{Effectiveness, TreatmentType};
    use crate::disease_db;
    use crate::session::token_from_cookie_header;
    use crate::upload::{sanitize_filename, ImageFormat};

    #[test]
    fn test_disease_lookup_known_labels() {
        let info = disease_db::lookup("Tomato___Late_blight");
        assert!(info.description.contains("Phytophthora infestans"));
        assert!(info.severity.starts_with("High"));

        let healthy = disease_db::lookup("Tomato___healthy");
        assert!(healthy.severity.contains("None"));
        assert_eq!(
            healthy.treatment,
            vec!["Continue regular care and monitoring"]
        );
    }

    #[test]
    fn test_disease_lookup_unknown_label_falls_back() {
        let fallback = disease_db::lookup("Maize___rust");
        assert!(fallback.severity.contains("Unknown"));
        // Any unrecognized label gets exactly the same default entry.
        let other = disease_db::lookup("not-a-label");
        assert_eq!(fallback.description, other.description);
        assert_eq!(fallback.treatment, other.treatment);
    }

    #[test]
    fn test_softmax_is_a_probability_distribution() {
        let probs = softmax(&[1.0, 2.0, 3.0]);
        let sum: f64 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
        // Monotonic: the largest logit keeps the largest probability.
        assert!(probs[2] > probs[1] && probs[1] > probs[0]);
    }

    #[test]
    fn test_softmax_stable_for_large_logits() {
        let probs = softmax(&[1000.0, 999.0, -1000.0]);
        assert!(probs.iter().all(|p| p.is_finite()));
        let sum: f64 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_select_prediction_confidence_range() {
        let scores = vec![
            ClassScore {
                label: "Tomato___Early_blight".to_string(),
                score: 7.2,
            },
            ClassScore {
                label: "Tomato___healthy".to_string(),
                score: -1.3,
            },
            ClassScore {
                label: "Potato___Late_blight".to_string(),
                score: 0.4,
            },
        ];
        let (label, confidence) = select_prediction(&scores).unwrap();
        assert_eq!(label, "Tomato___Early_blight");
        assert!((0.0..=100.0).contains(&confidence));

        // A dominant logit approaches but never exceeds 100.
        let extreme = vec![
            ClassScore {
                label: "a".to_string(),
                score: 500.0,
            },
            ClassScore {
                label: "b".to_string(),
                score: -500.0,
            },
        ];
        let (_, confidence) = select_prediction(&extreme).unwrap();
        assert!(confidence <= 100.0);
        assert!(confidence > 99.0);
    }

    #[test]
    fn test_select_prediction_rejects_empty_scores() {
        assert!(select_prediction(&[]).is_err());
    }

    #[test]
    fn test_sanitize_filename_strips_traversal() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("..\\..\\boot.ini"), "boot.ini");
        assert_eq!(sanitize_filename("leaf photo (1).jpg"), "leafphoto1.jpg");
        assert_eq!(sanitize_filename(".hidden"), "hidden");
        assert_eq!(sanitize_filename("tomato.jpg"), "tomato.jpg");
    }

    #[test]
    fn test_image_format_sniffing() {
        let mut png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        png.extend_from_slice(&[0; 8]);
        assert_eq!(ImageFormat::sniff(&png), Some(ImageFormat::Png));

        let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0];
        jpeg.extend_from_slice(&[0; 8]);
        assert_eq!(ImageFormat::sniff(&jpeg), Some(ImageFormat::Jpeg));

        assert_eq!(ImageFormat::sniff(b"this is not an image data"), None);
        assert_eq!(ImageFormat::sniff(&[0xFF, 0xD8]), None); // too short
    }

    #[test]
    fn test_session_cookie_parsing() {
        assert_eq!(
            token_from_cookie_header("session=abc123; theme=dark"),
            Some("abc123")
        );
        assert_eq!(
            token_from_cookie_header("theme=dark; session=abc123"),
            Some("abc123")
        );
        assert_eq!(token_from_cookie_header("theme=dark"), None);
        assert_eq!(token_from_cookie_header("session="), None);
        assert_eq!(token_from_cookie_header(""), None);
    }

    #[test]
    fn test_enum_boundary_parsing() {
        let t: TreatmentType = serde_json::from_str("\"organic\"").unwrap();
        assert_eq!(t, TreatmentType::Organic);
        assert_eq!(t.as_str(), "organic");

        let e: Effectiveness = serde_json::from_str("\"partially_effective\"").unwrap();
        assert_eq!(e, Effectiveness::PartiallyEffective);
        assert_eq!(e.as_str(), "partially_effective");

        // Values outside the enumeration are rejected at the boundary.
        assert!(serde_json::from_str::<TreatmentType>("\"homeopathic\"").is_err());
        assert!(serde_json::from_str::<Effectiveness>("\"maybe\"").is_err());
    }
}
