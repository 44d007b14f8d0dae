use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

/// Curated advisory text for one disease label.
#[derive(Debug, Clone, Serialize)]
pub struct DiseaseInfo {
    pub description: String,
    pub symptoms: String,
    pub treatment: Vec<String>,
    pub prevention: Vec<String>,
    pub organic_solution: String,
    pub severity: String,
}

fn info(
    description: &str,
    symptoms: &str,
    treatment: &[&str],
    prevention: &[&str],
    organic_solution: &str,
    severity: &str,
) -> DiseaseInfo {
    DiseaseInfo {
        description: description.to_string(),
        symptoms: symptoms.to_string(),
        treatment: treatment.iter().map(|s| s.to_string()).collect(),
        prevention: prevention.iter().map(|s| s.to_string()).collect(),
        organic_solution: organic_solution.to_string(),
        severity: severity.to_string(),
    }
}

static DISEASE_INFO: Lazy<HashMap<&'static str, DiseaseInfo>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert(
        "Tomato___Late_blight",
        info(
            "Late blight is a devastating disease caused by the fungus-like organism Phytophthora infestans.",
            "Dark brown to black lesions on leaves, stems, and fruits. White fungal growth on undersides of leaves in humid conditions.",
            &[
                "Remove and destroy infected plants immediately",
                "Apply copper-based fungicides (Copper oxychloride 50% WP @ 3g/liter)",
                "Use resistant varieties like Pusa Ruby, Pusa Rohini",
                "Ensure proper spacing for air circulation",
            ],
            &[
                "Avoid overhead irrigation",
                "Plant in well-drained soil",
                "Remove volunteer potato plants nearby",
                "Apply preventive fungicide sprays during monsoon",
            ],
            "Neem oil spray (5ml/liter) + Bordeaux mixture (1%)",
            "High - Can destroy entire crop within 2 weeks",
        ),
    );
    m.insert(
        "Tomato___Early_blight",
        info(
            "Early blight is caused by fungus Alternaria solani, affecting older leaves first.",
            "Circular spots with concentric rings (target-like pattern) on older leaves. Yellowing around spots.",
            &[
                "Apply Mancozeb 75% WP @ 2.5g/liter water",
                "Remove infected lower leaves",
                "Spray Chlorothalonil 75% WP @ 2g/liter",
                "Maintain adequate potassium levels in soil",
            ],
            &[
                "Crop rotation with non-solanaceous crops",
                "Mulching to prevent soil splash",
                "Adequate spacing between plants",
                "Balanced fertilization (avoid excess nitrogen)",
            ],
            "Baking soda spray (1 tablespoon/liter water) + liquid soap (few drops)",
            "Medium - Progressive disease, manageable if caught early",
        ),
    );
    m.insert(
        "Potato___Late_blight",
        info(
            "Same pathogen as tomato late blight. Historically caused Irish Potato Famine.",
            "Water-soaked lesions on leaves turning dark brown/black. White mold on leaf undersides in moist conditions.",
            &[
                "Metalaxyl + Mancozeb combination @ 2.5g/liter",
                "Remove infected tubers immediately",
                "Spray Cymoxanil 8% + Mancozeb 64% WP",
                "Hill up soil around plants to protect tubers",
            ],
            &[
                "Use certified disease-free seed potatoes",
                "Plant resistant varieties (Kufri Giriraj, Kufri Jyoti)",
                "Avoid irrigation late in the day",
                "Proper storage of harvested potatoes",
            ],
            "Copper sulfate solution (Bordeaux mixture 1%)",
            "Very High - Can cause total crop loss",
        ),
    );
    m.insert(
        "Tomato___healthy",
        info(
            "Your crop appears healthy with no visible disease symptoms.",
            "No disease detected. Plant shows normal growth patterns.",
            &["Continue regular care and monitoring"],
            &[
                "Maintain current good practices",
                "Regular monitoring for early disease detection",
                "Balanced fertilization",
                "Proper irrigation management",
            ],
            "No treatment needed. Continue preventive care.",
            "None - Plant is healthy",
        ),
    );
    m
});

static DEFAULT_INFO: Lazy<DiseaseInfo> = Lazy::new(|| {
    info(
        "Disease detected. Consult local agricultural extension officer for detailed information.",
        "Various symptoms may be present. Please observe your crop carefully.",
        &[
            "Consult Krishi Vigyan Kendra (KVK)",
            "Contact agricultural extension officer",
            "Take sample to nearest agricultural university",
        ],
        &[
            "Regular monitoring",
            "Proper crop management",
            "Maintain field hygiene",
        ],
        "Consult organic farming experts in your area",
        "Unknown - Professional diagnosis recommended",
    )
});

/// Returns the curated entry for a label, or the default advisory for
/// anything the table does not know. Never fails.
pub fn lookup(label: &str) -> &'static DiseaseInfo {
    DISEASE_INFO.get(label).unwrap_or(&DEFAULT_INFO)
}

/// The full curated table, for the disease-database endpoint.
pub fn entries() -> &'static HashMap<&'static str, DiseaseInfo> {
    &DISEASE_INFO
}
