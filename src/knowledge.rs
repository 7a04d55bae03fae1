//! Static disease knowledge base and name lookup.
//!
//! Model output rarely uses the exact table names, so lookup walks the table
//! in passes: exact names first, then a looser pass where the earliest key
//! matching either partial rule wins.

use std::borrow::Cow;

#[derive(Debug, PartialEq, Eq)]
pub struct DiseaseRecord {
    pub name: &'static str,
    pub desc: &'static str,
    pub spread: &'static str,
    pub organic: &'static [&'static str],
    pub chemical: &'static [&'static str],
    pub prevention: &'static [&'static str],
}

pub const HEALTHY_KEY: &str = "Healthy";

pub static DISEASE_TABLE: &[DiseaseRecord] = &[
    DiseaseRecord {
        name: "Apple Scab",
        desc: "Fungal disease (Venturia inaequalis) creating dark scabby lesions on leaves and fruit, reducing yield and marketability.",
        spread: "Spreads through fungal spores during wet spring weather via wind and rain splash from infected fallen leaves.",
        organic: &[
            "Apply sulfur fungicide every 7-10 days in wet periods",
            "Use neem oil as preventive spray",
            "Remove and destroy fallen leaves in autumn",
        ],
        chemical: &[
            "Captan fungicide at bud break",
            "Myclobutanil — systemic fungicide",
            "Mancozeb — protective fungicide",
        ],
        prevention: &[
            "Plant resistant varieties (Liberty, Enterprise)",
            "Prune for good air circulation",
            "Rake and destroy fallen leaves",
            "Avoid overhead irrigation",
        ],
    },
    DiseaseRecord {
        name: "Tomato Late Blight",
        desc: "Caused by Phytophthora infestans — same pathogen as the Irish Potato Famine. Creates dark water-soaked lesions that destroy entire plants within days.",
        spread: "Spreads extremely rapidly through airborne spores in cool wet conditions (60-70°F). Can destroy a field in days. Spores travel miles by wind.",
        organic: &[
            "Remove and destroy infected plants immediately",
            "Apply copper hydroxide spray preventively",
            "Improve air circulation by staking plants",
        ],
        chemical: &[
            "Metalaxyl — most effective systemic",
            "Chlorothalonil — protective",
            "Mancozeb + cymoxanil combination",
        ],
        prevention: &[
            "Use certified disease-free transplants",
            "Avoid overhead irrigation",
            "Plant resistant varieties",
            "Monitor weather for blight conditions",
        ],
    },
    DiseaseRecord {
        name: "Tomato Early Blight",
        desc: "Caused by Alternaria solani. Produces target-like brown spots with concentric rings on lower leaves, progressing upward through the plant.",
        spread: "Spreads through spores in soil and infected debris. Warm temperatures (75-85°F) and high humidity favor spread. Splashing water moves spores.",
        organic: &[
            "Remove infected lower leaves immediately",
            "Apply neem oil or copper fungicide",
            "Mulch around plants to prevent soil splash",
        ],
        chemical: &[
            "Chlorothalonil every 7-10 days",
            "Azoxystrobin — strobilurin fungicide",
            "Mancozeb — protective",
        ],
        prevention: &[
            "Stake plants for air circulation",
            "Water at base not overhead",
            "Rotate crops every 3 years",
            "Remove plant debris after harvest",
        ],
    },
    DiseaseRecord {
        name: "Potato Late Blight",
        desc: "Most devastating potato disease caused by Phytophthora infestans. Creates dark water-soaked lesions with white mold on leaf undersides. Tubers rot in storage.",
        spread: "Spreads through airborne spores in cool wet weather. Infected seed potatoes are primary source. Can spread from nearby tomato plants.",
        organic: &[
            "Remove and destroy infected plants immediately",
            "Apply copper-based fungicide preventively",
            "Avoid working in fields when wet",
        ],
        chemical: &[
            "Metalaxyl-M (Ridomil Gold)",
            "Cymoxanil + mancozeb",
            "Dimethomorph — systemic",
        ],
        prevention: &[
            "Use certified disease-free seed potatoes",
            "Hill soil to protect tubers",
            "Avoid overhead irrigation",
            "Destroy volunteer potato plants",
        ],
    },
    DiseaseRecord {
        name: "Potato Early Blight",
        desc: "Caused by Alternaria solani. Creates dark brown spots with concentric rings on older leaves, reducing photosynthesis and weakening plants before harvest.",
        spread: "Spreads through spores from infected debris. Warm humid weather and stressed plants are most susceptible. Spreads by wind, rain, and contaminated tools.",
        organic: &[
            "Remove infected leaves",
            "Apply copper fungicide",
            "Ensure adequate plant nutrition to reduce stress",
        ],
        chemical: &["Chlorothalonil", "Mancozeb", "Azoxystrobin"],
        prevention: &[
            "Rotate crops",
            "Maintain proper plant nutrition",
            "Avoid overhead irrigation",
            "Use certified seed potatoes",
        ],
    },
    DiseaseRecord {
        name: "Corn Gray Leaf Spot",
        desc: "Caused by Cercospora zeae-maydis. Produces rectangular gray-tan lesions parallel to leaf veins, reducing photosynthesis and yield significantly.",
        spread: "Spreads through spores from infected crop residue. High humidity, warm nights, and heavy dew favor development. Minimum tillage increases risk.",
        organic: &[
            "Rotate crops away from corn for 1-2 years",
            "Till infected residue to speed decomposition",
            "Improve field drainage",
        ],
        chemical: &[
            "Azoxystrobin (Quadris)",
            "Propiconazole (Tilt)",
            "Pyraclostrobin + metconazole",
        ],
        prevention: &[
            "Plant resistant hybrids",
            "Rotate crops annually",
            "Manage crop residue",
            "Wider row spacing for air circulation",
        ],
    },
    DiseaseRecord {
        name: "Corn Common Rust",
        desc: "Caused by Puccinia sorghi. Creates small, oval, brick-red pustules on both leaf surfaces. Severe infections reduce photosynthesis and yield.",
        spread: "Spreads through airborne urediniospores. Cool temperatures (60-77°F) and high humidity favor infection. Spores can travel long distances by wind.",
        organic: &[
            "Apply sulfur-based fungicide at first sign",
            "Remove heavily infected leaves",
            "Improve air circulation",
        ],
        chemical: &["Azoxystrobin", "Propiconazole", "Trifloxystrobin"],
        prevention: &[
            "Plant resistant hybrids",
            "Early planting to avoid peak rust season",
            "Monitor fields regularly",
            "Apply preventive fungicides in high-risk areas",
        ],
    },
    DiseaseRecord {
        name: "Grape Black Rot",
        desc: "Caused by Guignardia bidwellii. Creates circular brown lesions on leaves and turns berries into hard black shriveled mummies that remain on the vine.",
        spread: "Spreads through spores from mummified berries and infected canes. Warm wet weather (65-85°F) during bloom is the critical infection period.",
        organic: &[
            "Remove all mummified berries from vine and ground",
            "Apply copper fungicide from bud break",
            "Improve canopy air circulation by pruning",
        ],
        chemical: &[
            "Myclobutanil (Rally)",
            "Mancozeb — protective",
            "Tebuconazole — systemic",
        ],
        prevention: &[
            "Remove mummified berries before spring",
            "Prune for open canopy",
            "Apply fungicides from bud break through veraison",
            "Avoid wetting foliage",
        ],
    },
    DiseaseRecord {
        name: "Tomato Bacterial Spot",
        desc: "Caused by Xanthomonas species bacteria. Creates small dark water-soaked spots on leaves, stems, and fruit. Severely reduces fruit quality and marketability.",
        spread: "Spreads through infected seed, transplants, and rain splash. Warm wet weather (75-86°F) favors rapid spread. Spreads easily during transplanting.",
        organic: &[
            "Apply copper bactericide every 5-7 days",
            "Remove severely infected plants",
            "Avoid working in wet fields",
        ],
        chemical: &[
            "Copper hydroxide + mancozeb",
            "Streptomycin (limited use)",
            "Fixed copper bactericides",
        ],
        prevention: &[
            "Use certified disease-free seed",
            "Avoid overhead irrigation",
            "Rotate crops for 2-3 years",
            "Disinfect tools between plants",
        ],
    },
    DiseaseRecord {
        name: "Tomato Leaf Mold",
        desc: "Caused by Passalora fulva. Creates pale green to yellow spots on upper leaf surfaces with olive-green to grayish-purple mold on undersides.",
        spread: "Spreads through airborne spores in high humidity (85%+). Common in greenhouses and tunnels. Spores survive on plant debris and in soil.",
        organic: &[
            "Improve ventilation in greenhouses",
            "Remove infected leaves",
            "Apply copper-based fungicide",
        ],
        chemical: &["Chlorothalonil", "Mancozeb", "Azoxystrobin"],
        prevention: &[
            "Maintain humidity below 85%",
            "Improve air circulation",
            "Use resistant varieties",
            "Avoid overhead irrigation",
        ],
    },
    DiseaseRecord {
        name: HEALTHY_KEY,
        desc: "Your plant appears healthy with no visible signs of disease. The leaves show normal coloration, texture, and structure. Continue your current care routine.",
        spread: "No disease detected. Your plant is in excellent condition.",
        organic: &[
            "Continue regular weekly monitoring",
            "Maintain proper watering schedule",
            "Apply compost for soil health",
        ],
        chemical: &[
            "No treatment needed",
            "Consider preventive copper spray during high-risk periods",
        ],
        prevention: &[
            "Maintain proper plant spacing for air circulation",
            "Water at the base of plants",
            "Monitor regularly for early signs",
            "Practice crop rotation annually",
        ],
    },
    // Rice
    DiseaseRecord {
        name: "Rice Blast",
        desc: "Caused by Magnaporthe oryzae — the most economically important rice disease worldwide. Creates diamond-shaped lesions with gray centers and brown borders on leaves. Neck blast causes complete panicle death.",
        spread: "Spreads through airborne spores in high humidity (>90%) and temperatures of 77-82°F. Excess nitrogen fertilization greatly increases susceptibility.",
        organic: &[
            "Remove and destroy infected plant debris",
            "Apply silicon fertilizer to strengthen cell walls",
            "Use blast-resistant varieties (IR64, Swarna, IRRI varieties)",
        ],
        chemical: &[
            "Tricyclazole — most effective systemic fungicide",
            "Isoprothiolane — systemic with good efficacy",
            "Propiconazole — broad spectrum triazole",
        ],
        prevention: &[
            "Plant blast-resistant varieties",
            "Avoid excess nitrogen fertilization",
            "Maintain proper water management",
            "Apply silicon fertilizer",
            "Protect at booting stage to prevent neck blast",
        ],
    },
    DiseaseRecord {
        name: "Rice Brown Spot",
        desc: "Caused by Cochliobolus miyabeanus. Creates oval brown lesions with yellow halos on leaves. Strongly linked to nutrient deficiency, especially potassium and silicon.",
        spread: "Spreads through infected seeds and airborne spores. Nutrient-deficient plants are most susceptible. Warm humid conditions favor spread.",
        organic: &[
            "Improve soil fertility with balanced NPK",
            "Apply silicon fertilizer",
            "Use healthy certified seeds",
        ],
        chemical: &[
            "Mancozeb — protective fungicide",
            "Iprodione — systemic",
            "Propiconazole — broad spectrum",
        ],
        prevention: &[
            "Use certified disease-free seeds",
            "Maintain balanced soil nutrition",
            "Treat seeds with fungicide before planting",
            "Avoid water stress",
        ],
    },
    DiseaseRecord {
        name: "Rice Bacterial Leaf Blight",
        desc: "Caused by Xanthomonas oryzae pv. oryzae. Creates water-soaked lesions that turn yellow then white along leaf margins. One of the most serious bacterial diseases of rice.",
        spread: "Spreads through infected water, rain splash, and wind. Enters through wounds and natural openings. Flooding and high nitrogen favor spread.",
        organic: &[
            "Drain fields during early infection",
            "Remove infected plant debris",
            "Use resistant varieties",
        ],
        chemical: &[
            "No highly effective chemical cure",
            "Copper bactericides may reduce spread",
            "Streptomycin (limited use)",
        ],
        prevention: &[
            "Use resistant varieties",
            "Avoid excess nitrogen",
            "Improve field drainage",
            "Use certified disease-free seeds",
            "Remove infected debris after harvest",
        ],
    },
    DiseaseRecord {
        name: "Rice Sheath Blight",
        desc: "Caused by Rhizoctonia solani. Creates oval lesions on leaf sheaths with gray-white centers and brown borders. Causes lodging and significant yield loss in dense plantings.",
        spread: "Spreads through sclerotia in soil and water. High plant density, excess nitrogen, and flooding favor rapid spread.",
        organic: &[
            "Reduce plant density",
            "Drain fields periodically",
            "Remove infected plant material",
        ],
        chemical: &[
            "Validamycin — most effective",
            "Hexaconazole — systemic triazole",
            "Propiconazole — broad spectrum",
        ],
        prevention: &[
            "Reduce plant density",
            "Avoid excess nitrogen",
            "Drain fields periodically",
            "Use resistant varieties",
            "Rotate crops",
        ],
    },
    // Sugarcane
    DiseaseRecord {
        name: "Sugarcane Red Rot",
        desc: "Caused by Colletotrichum falcatum — the most serious disease of sugarcane. Creates red discoloration inside the stalk with white patches and a sour smell. Can destroy entire crops.",
        spread: "Spreads through infected setts (planting material), waterlogging, and contaminated soil. Spreads rapidly in wet conditions.",
        organic: &[
            "Hot water treatment of setts at 50°C for 2 hours",
            "Remove and destroy infected clumps immediately",
            "Improve field drainage",
        ],
        chemical: &[
            "Carbendazim (0.1%) sett treatment before planting",
            "Thiophanate-methyl fungicide",
            "Copper oxychloride spray",
        ],
        prevention: &[
            "Use disease-free setts from certified nurseries",
            "Plant resistant varieties (Co 86032, CoJ 64)",
            "Avoid waterlogging",
            "Crop rotation every 3-4 years",
            "Disinfect cutting tools",
        ],
    },
    DiseaseRecord {
        name: "Sugarcane Smut",
        desc: "Caused by Sporisorium scitamineum. Produces black whip-like structures replacing the growing shoot. Severely reduces yield and sucrose content.",
        spread: "Spreads through airborne spores from infected plants. Spreads through infected setts. Warm dry conditions favor spread.",
        organic: &[
            "Rogue out and destroy infected plants immediately",
            "Hot water treatment of setts",
            "Remove infected plants before spores mature",
        ],
        chemical: &[
            "Propiconazole sett treatment",
            "Triadimefon fungicide",
            "Carbendazim treatment",
        ],
        prevention: &[
            "Use hot water treated setts",
            "Plant resistant varieties",
            "Avoid ratoon crops from infected fields",
            "Regular field monitoring",
        ],
    },
    // Wheat
    DiseaseRecord {
        name: "Wheat Yellow Rust",
        desc: "Caused by Puccinia striiformis — one of the most destructive wheat diseases. Creates yellow-orange pustules in stripes along leaf veins. Can cause 70%+ yield loss in susceptible varieties.",
        spread: "Spreads through airborne urediniospores over long distances. Cool temperatures (50-59°F) and high humidity favor infection. Can spread across continents.",
        organic: &[
            "Remove infected plant material",
            "Apply sulfur-based fungicide",
            "Use resistant varieties immediately",
        ],
        chemical: &[
            "Tebuconazole — most effective triazole",
            "Propiconazole — systemic",
            "Azoxystrobin + propiconazole combination",
        ],
        prevention: &[
            "Plant resistant varieties",
            "Monitor fields regularly from tillering",
            "Apply preventive fungicides in high-risk areas",
            "Early planting to avoid peak rust season",
        ],
    },
    DiseaseRecord {
        name: "Wheat Brown Rust",
        desc: "Caused by Puccinia triticina (leaf rust). Creates small round orange-brown pustules on upper leaf surfaces. Very common and widespread wheat disease.",
        spread: "Spreads through airborne spores. Warm temperatures (59-77°F) and high humidity favor infection. Can spread rapidly across fields.",
        organic: &[
            "Apply sulfur fungicide at first sign",
            "Remove heavily infected leaves",
            "Use resistant varieties",
        ],
        chemical: &[
            "Triazole fungicides (tebuconazole, propiconazole)",
            "Strobilurin fungicides (azoxystrobin)",
            "Combination products",
        ],
        prevention: &[
            "Plant resistant varieties",
            "Early planting",
            "Monitor from tillering stage",
            "Apply preventive fungicides in high-risk seasons",
        ],
    },
    DiseaseRecord {
        name: "Wheat Fusarium Head Blight",
        desc: "Caused by Fusarium graminearum. Creates pink/salmon mold on wheat heads. Produces dangerous mycotoxins (deoxynivalenol/DON) that contaminate grain and are harmful to humans and animals.",
        spread: "Spreads through airborne spores during flowering. Warm wet weather during flowering is critical infection period. Corn-wheat rotation increases risk.",
        organic: &[
            "Remove infected heads",
            "Harvest promptly when mature",
            "Improve field drainage",
        ],
        chemical: &[
            "Tebuconazole at flowering — most effective",
            "Metconazole — systemic",
            "Prothioconazole — excellent efficacy",
        ],
        prevention: &[
            "Apply fungicide at flowering stage",
            "Use resistant varieties",
            "Avoid corn-wheat rotation",
            "Harvest promptly",
            "Test grain for mycotoxins before use",
        ],
    },
    // Banana
    DiseaseRecord {
        name: "Banana Panama Disease",
        desc: "Caused by Fusarium oxysporum f.sp. cubense — the most devastating banana disease. Causes yellowing, wilting, and death of plants. No chemical cure exists. Destroyed the Gros Michel variety globally.",
        spread: "Spreads through infected soil, water, and planting material. Survives in soil for decades. Spreads through contaminated tools and footwear.",
        organic: &[
            "Remove and destroy infected plants immediately",
            "Do not replant susceptible varieties in infected soil",
            "Improve drainage",
            "Use biological control agents (Trichoderma)",
        ],
        chemical: &[
            "No effective chemical cure",
            "Soil fumigation may reduce inoculum",
            "Preventive biological treatments",
        ],
        prevention: &[
            "Use disease-free tissue culture planting material",
            "Plant resistant varieties (Cavendish, FHIA hybrids)",
            "Disinfect tools and footwear",
            "Avoid moving soil from infected areas",
            "Improve drainage",
        ],
    },
    DiseaseRecord {
        name: "Banana Black Sigatoka",
        desc: "Caused by Mycosphaerella fijiensis. Creates black streaks on leaves that expand into large necrotic areas. Reduces photosynthesis by up to 50%, severely reducing yield and fruit quality.",
        spread: "Spreads through airborne spores in humid conditions. Requires 12+ hours of leaf wetness for infection. Can spread rapidly in plantations.",
        organic: &[
            "Remove infected leaves regularly",
            "Improve drainage and air circulation",
            "Apply copper-based fungicides",
        ],
        chemical: &[
            "Propiconazole — systemic triazole",
            "Mancozeb — protective",
            "Trifloxystrobin — strobilurin",
            "Rotate fungicide classes to prevent resistance",
        ],
        prevention: &[
            "Use resistant varieties",
            "Remove infected leaves",
            "Improve drainage",
            "Maintain proper plant spacing",
            "Regular fungicide program",
        ],
    },
    // Mango
    DiseaseRecord {
        name: "Mango Anthracnose",
        desc: "Caused by Colletotrichum gloeosporioides — the most common mango disease. Creates black spots on leaves, flowers, and fruit. Causes significant post-harvest losses.",
        spread: "Spreads through spores in wet conditions. Infects flowers and young fruit during wet weather. Post-harvest spread in storage.",
        organic: &[
            "Apply copper fungicide at flowering",
            "Bag fruits to prevent infection",
            "Improve air circulation by pruning",
        ],
        chemical: &[
            "Copper hydroxide + mancozeb at flowering",
            "Azoxystrobin — systemic",
            "Propiconazole — triazole",
            "Post-harvest hot water treatment (52°C for 5 min)",
        ],
        prevention: &[
            "Apply fungicides from flowering through fruit development",
            "Prune for open canopy",
            "Bag fruits",
            "Avoid wetting foliage",
            "Post-harvest treatment",
        ],
    },
    DiseaseRecord {
        name: "Mango Powdery Mildew",
        desc: "Caused by Oidium mangiferae. Creates white powdery coating on young leaves, flowers, and fruit. Severely reduces fruit set and yield during flowering season.",
        spread: "Spreads through airborne spores. Warm days and cool nights with low humidity favor infection. Most severe during flowering.",
        organic: &[
            "Apply wettable sulfur at flower emergence",
            "Neem oil spray",
            "Improve air circulation",
        ],
        chemical: &[
            "Sulfur fungicides — very effective",
            "Hexaconazole — systemic",
            "Myclobutanil — triazole",
            "Tebuconazole",
        ],
        prevention: &[
            "Apply preventive fungicides at flower emergence",
            "Prune for open canopy",
            "Avoid excess nitrogen",
            "Monitor during flowering season",
        ],
    },
    // Coffee
    DiseaseRecord {
        name: "Coffee Leaf Rust",
        desc: "Caused by Hemileia vastatrix — the most important coffee disease worldwide. Creates orange-yellow powdery pustules on leaf undersides. Destroyed the Sri Lanka coffee industry in the 1870s.",
        spread: "Spreads through airborne spores in humid conditions. Rain splash and wind spread spores. Warm temperatures (59-77°F) and high humidity favor infection.",
        organic: &[
            "Apply copper fungicides preventively",
            "Improve shade management",
            "Maintain proper plant nutrition",
        ],
        chemical: &[
            "Copper hydroxide — protective",
            "Tebuconazole — systemic triazole",
            "Trifloxystrobin — strobilurin",
            "Propiconazole",
        ],
        prevention: &[
            "Use resistant varieties (Catimor, Sarchimor, Ruiru 11)",
            "Maintain proper shade",
            "Apply preventive copper fungicides",
            "Prune for air circulation",
            "Balanced fertilization",
        ],
    },
];

const GENERIC_SPREAD: &str = "Spreads through spores, infected plant material, insects, or contaminated soil and water. Warm humid conditions accelerate spread.";
const GENERIC_ORGANIC: &[&str] = &[
    "Remove and destroy infected plant parts",
    "Apply neem oil or copper-based fungicide",
    "Improve air circulation around plants",
];
const GENERIC_CHEMICAL: &[&str] = &[
    "Consult local agricultural extension for recommendations",
    "Apply broad-spectrum fungicide as directed",
    "Follow all safety instructions carefully",
];
const GENERIC_PREVENTION: &[&str] = &[
    "Practice crop rotation every 2-3 years",
    "Use disease-resistant varieties",
    "Maintain proper plant spacing",
    "Avoid overhead irrigation",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    Exact,
    QueryContainsKey,
    KeyContainsFirstToken,
}

impl MatchRule {
    fn matches(self, query: &NormalizedQuery<'_>, key: &str) -> bool {
        match self {
            Self::Exact => query.lower == key,
            Self::QueryContainsKey => query.lower.contains(key),
            Self::KeyContainsFirstToken => key.contains(query.first_token),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::QueryContainsKey => "query-contains-key",
            Self::KeyContainsFirstToken => "key-contains-first-token",
        }
    }
}

/// Passes in evaluation order. A pass walks the table once; a key hits when
/// any rule of the pass matches it, so the earliest such key wins the pass.
pub const LOOKUP_PASSES: &[&[MatchRule]] = &[
    &[MatchRule::Exact],
    &[MatchRule::QueryContainsKey, MatchRule::KeyContainsFirstToken],
];

struct NormalizedQuery<'a> {
    lower: &'a str,
    first_token: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    Matched {
        key: &'static str,
        rule: MatchRule,
    },
    /// Empty or blank input resolves to the Healthy record.
    EmptyInput,
    Generic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiseaseInfo {
    pub outcome: LookupOutcome,
    pub desc: Cow<'static, str>,
    pub spread: &'static str,
    pub organic: &'static [&'static str],
    pub chemical: &'static [&'static str],
    pub prevention: &'static [&'static str],
}

impl DiseaseInfo {
    fn from_record(record: &'static DiseaseRecord, outcome: LookupOutcome) -> Self {
        Self {
            outcome,
            desc: Cow::Borrowed(record.desc),
            spread: record.spread,
            organic: record.organic,
            chemical: record.chemical,
            prevention: record.prevention,
        }
    }

    fn generic(name: &str) -> Self {
        Self {
            outcome: LookupOutcome::Generic,
            desc: Cow::Owned(format!(
                "{name} is a plant disease affecting crop health and yield. Timely treatment is essential for effective management."
            )),
            spread: GENERIC_SPREAD,
            organic: GENERIC_ORGANIC,
            chemical: GENERIC_CHEMICAL,
            prevention: GENERIC_PREVENTION,
        }
    }

    pub fn matched_key(&self) -> Option<&'static str> {
        match self.outcome {
            LookupOutcome::Matched { key, .. } => Some(key),
            LookupOutcome::EmptyInput => Some(HEALTHY_KEY),
            LookupOutcome::Generic => None,
        }
    }
}

pub fn record(name: &str) -> Option<&'static DiseaseRecord> {
    DISEASE_TABLE.iter().find(|record| record.name == name)
}

fn healthy_record() -> &'static DiseaseRecord {
    // HEALTHY_KEY is a literal entry of DISEASE_TABLE.
    record(HEALTHY_KEY).unwrap_or(&DISEASE_TABLE[0])
}

pub fn lookup(name: Option<&str>) -> DiseaseInfo {
    let raw = name.map(str::trim).unwrap_or_default();
    let lower = raw.to_lowercase();
    let Some(first_token) = lower.split_whitespace().next() else {
        return DiseaseInfo::from_record(healthy_record(), LookupOutcome::EmptyInput);
    };
    let query = NormalizedQuery {
        lower: &lower,
        first_token,
    };

    let keys: Vec<(String, &'static DiseaseRecord)> = DISEASE_TABLE
        .iter()
        .map(|record| (record.name.to_lowercase(), record))
        .collect();

    for pass in LOOKUP_PASSES {
        let hit = keys.iter().find_map(|(key, record)| {
            pass.iter()
                .find(|rule| rule.matches(&query, key))
                .map(|rule| (*record, *rule))
        });
        if let Some((record, rule)) = hit {
            return DiseaseInfo::from_record(
                record,
                LookupOutcome::Matched {
                    key: record.name,
                    rule,
                },
            );
        }
    }

    DiseaseInfo::generic(name.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_key_resolves_to_itself() {
        for record in DISEASE_TABLE {
            let info = lookup(Some(record.name));
            assert_eq!(info.matched_key(), Some(record.name), "{}", record.name);
            assert_eq!(info.desc, record.desc);
        }
    }

    #[test]
    fn exact_match_beats_earlier_key_sharing_first_token() {
        let info = lookup(Some("tomato leaf mold"));
        assert_eq!(
            info.outcome,
            LookupOutcome::Matched {
                key: "Tomato Leaf Mold",
                rule: MatchRule::Exact
            }
        );
    }

    #[test]
    fn query_containing_key_is_matched() {
        let info = lookup(Some("Severe Corn Common Rust"));
        assert_eq!(info.matched_key(), Some("Corn Common Rust"));
        assert!(matches!(
            info.outcome,
            LookupOutcome::Matched {
                rule: MatchRule::QueryContainsKey,
                ..
            }
        ));
    }

    #[test]
    fn partial_conditions_share_one_pass_in_table_order() {
        // an earlier key sharing the first token beats a later contained key
        let info = lookup(Some("Potato Tomato Leaf Mold"));
        assert_eq!(info.matched_key(), Some("Potato Late Blight"));
        assert!(matches!(
            info.outcome,
            LookupOutcome::Matched {
                rule: MatchRule::KeyContainsFirstToken,
                ..
            }
        ));

        let info = lookup(Some("Tomato with Potato Late Blight"));
        assert_eq!(info.matched_key(), Some("Tomato Late Blight"));

        let info = lookup(Some("Leaf Rice Blast"));
        assert_eq!(info.matched_key(), Some("Corn Gray Leaf Spot"));

        let info = lookup(Some("Corn Common Rust (Maize)"));
        assert_eq!(info.matched_key(), Some("Corn Gray Leaf Spot"));
    }

    #[test]
    fn first_token_falls_back_to_first_key_in_table_order() {
        let info = lookup(Some("Tomato Mosaic Virus"));
        assert_eq!(info.matched_key(), Some("Tomato Late Blight"));

        let info = lookup(Some("wheat septoria"));
        assert_eq!(info.matched_key(), Some("Wheat Yellow Rust"));
    }

    #[test]
    fn empty_input_returns_healthy_record() {
        for input in [None, Some(""), Some("   ")] {
            let info = lookup(input);
            assert_eq!(info.outcome, LookupOutcome::EmptyInput);
            assert_eq!(info.desc, healthy_record().desc);
        }
    }

    #[test]
    fn unmatched_name_gets_generic_record_quoting_input() {
        let info = lookup(Some("Xyz Unknown Disease"));
        assert_eq!(info.outcome, LookupOutcome::Generic);
        assert!(info.desc.contains("Xyz Unknown Disease"));

        let info = lookup(Some("  Xyz  Disease "));
        assert!(info.desc.contains("  Xyz  Disease "));
        assert_eq!(info.organic, GENERIC_ORGANIC);
        assert_eq!(info.matched_key(), None);
    }

    #[test]
    fn tomato_late_blight_scenario() {
        let info = lookup(Some("Tomato Late Blight"));
        assert!(info.desc.starts_with("Caused by Phytophthora infestans"));
    }

    #[test]
    fn table_keeps_healthy_entry() {
        assert!(record(HEALTHY_KEY).is_some());
        assert_eq!(DISEASE_TABLE.len(), 25);
    }
}
