//! Default resume field catalogue: canonical column names, the label phrasings
//! each one is known to appear under, and the group it reports in.

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::extraction::fields::{FieldSpec, FieldSpecs};

/// Number of employment slots the candidate table carries.
pub const EMPLOYMENT_SLOT_COUNT: usize = 7;

/// Column prefixes and the prose ordinal the LLM uses for each slot.
pub const EMPLOYMENT_SLOTS: [(&str, &str); EMPLOYMENT_SLOT_COUNT] = [
    ("MostRecent", "Most Recent"),
    ("SecondMostRecent", "Second Most Recent"),
    ("ThirdMostRecent", "Third Most Recent"),
    ("FourthMostRecent", "Fourth Most Recent"),
    ("FifthMostRecent", "Fifth Most Recent"),
    ("SixthMostRecent", "Sixth Most Recent"),
    ("SeventhMostRecent", "Seventh Most Recent"),
];

pub const YEARS_OF_EXPERIENCE: &str = "YearsofExperience";
pub const AVG_TENURE: &str = "AvgTenure";
pub const LENGTH_IN_US: &str = "LengthinUS";
pub const LINKEDIN: &str = "Linkedin";
pub const TOP_SKILLS: &str = "TopSkills";

/// `TopSkills` is also stored split into `Skill1`..`Skill10`.
pub const SKILL_COLUMN_COUNT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldGroup {
    PersonalInformation,
    JobTitles,
    WorkHistory,
    Industry,
    Technical,
    Metrics,
}

impl FieldGroup {
    pub const ALL: [FieldGroup; 6] = [
        FieldGroup::PersonalInformation,
        FieldGroup::JobTitles,
        FieldGroup::WorkHistory,
        FieldGroup::Industry,
        FieldGroup::Technical,
        FieldGroup::Metrics,
    ];
}

type LabelTable = &'static [(&'static str, &'static [&'static str])];

const PERSONAL: LabelTable = &[
    ("FirstName", &["Their First Name", "First Name"]),
    ("MiddleName", &["Their Middle Name", "Middle Name"]),
    ("LastName", &["Their Last Name", "Last Name"]),
    ("Address", &["Their street address", "Street Address", "Address"]),
    ("City", &["Their City", "City"]),
    ("State", &["Their State", "State"]),
    (
        "ZipCode",
        &["Their Zip Code", "Zip Code", "Their Zip", "Zip", "Zipcode"],
    ),
    (
        "Phone1",
        &["Their Phone Number", "Phone Number 1", "Their Phone Number 1", "Phone1"],
    ),
    (
        "Phone2",
        &[
            "Their Second Phone Number",
            "Phone Number 2",
            "Their Phone Number 2",
            "Phone2",
        ],
    ),
    ("Email", &["Their Email", "Email 1", "Their Email 1", "Email"]),
    (
        "Email2",
        &["Their Second Email", "Email 2", "Their Email 2", "Email2"],
    ),
    (LINKEDIN, &["Their Linkedin URL", "LinkedIn URL", "LinkedIn"]),
    (
        "Bachelors",
        &["Their Bachelor's Degree", "Bachelor's Degree", "Bachelors"],
    ),
    (
        "Masters",
        &["Their Master's Degree", "Master's Degree", "Masters"],
    ),
    (
        "Certifications",
        &[
            "Their Certifications Listed",
            "Certifications",
            "Certifications Listed",
        ],
    ),
];

const JOB_TITLES: LabelTable = &[
    (
        "PrimaryTitle",
        &[
            "Best job title that fits their primary experience",
            "Best job title that fit their primary experience",
            "Primary Job Title",
        ],
    ),
    (
        "SecondaryTitle",
        &[
            "Best secondary job title that fits their secondary experience",
            "Best job title that fits their secondary experience",
            "Secondary Job Title",
        ],
    ),
    (
        "TertiaryTitle",
        &[
            "Best tertiary job title that fits their tertiary experience",
            "Best job title that fits their tertiary experience",
            "Tertiary Job Title",
        ],
    ),
];

const INDUSTRY: LabelTable = &[
    (
        "PrimaryIndustry",
        &[
            "Based on all 7 of their most recent companies above, what is the Primary industry they work in",
            "Primary Industry",
            "What is the Primary industry they work in",
            "Primary industry they work in",
            "Primary industry",
        ],
    ),
    (
        "SecondaryIndustry",
        &[
            "Based on all 7 of their most recent companies above, what is the Secondary industry they work in",
            "Secondary Industry",
            "What is the Secondary industry they work in",
            "Secondary industry they work in",
            "Secondary industry",
            "Second most common industry",
            "Second industry",
        ],
    ),
];

const TECHNICAL: LabelTable = &[
    ("TopSkills", &["Top 10 Technical Skills", "Top Skills"]),
    (
        "PrimarySoftwareLanguage",
        &[
            "What technical language do they use most often?",
            "Primary technical language",
            "Most used programming language",
        ],
    ),
    (
        "SecondarySoftwareLanguage",
        &[
            "What technical language do they use second most often?",
            "Secondary technical language",
            "Second most used programming language",
        ],
    ),
    (
        "TertiarySoftwareLanguage",
        &[
            "What technical language do they use third most often?",
            "Tertiary technical language",
            "Third most used programming language",
        ],
    ),
    (
        "SoftwareApp1",
        &[
            "What software do they talk about using the most?",
            "Primary software application",
            "Most used software",
        ],
    ),
    (
        "SoftwareApp2",
        &[
            "What software do they talk about using the second most?",
            "Secondary software application",
            "Second most used software",
        ],
    ),
    (
        "SoftwareApp3",
        &[
            "What software do they talk about using the third most?",
            "Tertiary software application",
            "Third most used software",
        ],
    ),
    (
        "SoftwareApp4",
        &[
            "What software do they talk about using the fourth most?",
            "Fourth software application",
            "Fourth most used software",
        ],
    ),
    (
        "SoftwareApp5",
        &[
            "What software do they talk about using the fifth most?",
            "Fifth software application",
            "Fifth most used software",
        ],
    ),
    (
        "Hardware1",
        &[
            "What physical hardware do they talk about using the most?",
            "Primary hardware",
            "Most used hardware",
            "Hardware 1",
        ],
    ),
    (
        "Hardware2",
        &[
            "What physical hardware do they talk about using the second most?",
            "Secondary hardware",
            "Second most used hardware",
            "Hardware 2",
        ],
    ),
    (
        "Hardware3",
        &[
            "What physical hardware do they talk about using the third most?",
            "Tertiary hardware",
            "Third most used hardware",
            "Hardware 3",
        ],
    ),
    (
        "Hardware4",
        &[
            "What physical hardware do they talk about using the fourth most?",
            "Fourth hardware",
            "Fourth most used hardware",
            "Hardware 4",
        ],
    ),
    (
        "Hardware5",
        &[
            "What physical hardware do they talk about using the fifth most?",
            "Fifth hardware",
            "Fifth most used hardware",
            "Hardware 5",
        ],
    ),
    (
        "PrimaryCategory",
        &[
            "Based on their skills, put them in a primary technical category",
            "Primary technical category",
        ],
    ),
    (
        "SecondaryCategory",
        &[
            "Based on their skills, put them in a subsidiary technical category",
            "Based on their skills, put them in a secondary technical category",
            "Secondary technical category",
        ],
    ),
    (
        "ProjectTypes",
        &["Types of projects they have worked on", "Project Types"],
    ),
    (
        "Specialty",
        &[
            "Based on their skills, categories, certifications, and industries, determine what they specialize in",
            "Specialty",
        ],
    ),
    (
        "Summary",
        &[
            "Based on all this knowledge, write a summary of this candidate that could be sellable to an employer",
            "Based on all this knowledge, write a summary of this candidate",
            "Summary",
        ],
    ),
];

const METRICS: LabelTable = &[
    (
        LENGTH_IN_US,
        &[
            "How long have they lived in the United States(numerical answer only)",
            "How long have they lived in the United States",
            "Length in US",
        ],
    ),
    (
        YEARS_OF_EXPERIENCE,
        &[
            "Total years of professional experience (numerical answer only)",
            "Total years of professional experience",
            "Years of Experience",
        ],
    ),
    (
        AVG_TENURE,
        &[
            "Average tenure at companies in years (numerical answer only)",
            "Average tenure at companies in years",
            "Average Tenure",
        ],
    ),
];

/// Column names for one employment slot.
#[derive(Debug, Clone)]
pub struct SlotColumns {
    pub company: String,
    pub start_date: String,
    pub end_date: String,
    pub location: String,
}

impl SlotColumns {
    pub fn for_prefix(prefix: &str) -> Self {
        Self {
            company: format!("{prefix}Company"),
            start_date: format!("{prefix}StartDate"),
            end_date: format!("{prefix}EndDate"),
            location: format!("{prefix}Location"),
        }
    }
}

/// The default field specs plus per-field group membership.
#[derive(Debug)]
pub struct Catalogue {
    specs: FieldSpecs,
    groups: Vec<(String, FieldGroup)>,
    slots: Vec<SlotColumns>,
    skill_columns: Vec<String>,
}

impl Catalogue {
    pub fn specs(&self) -> &FieldSpecs {
        &self.specs
    }

    pub fn group_of(&self, name: &str) -> Option<FieldGroup> {
        self.groups
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, g)| *g)
    }

    pub fn slots(&self) -> &[SlotColumns] {
        &self.slots
    }

    /// `Skill1`..`Skill10`. These are derived from `TopSkills` and are never
    /// asked for in the prompt.
    pub fn skill_columns(&self) -> &[String] {
        &self.skill_columns
    }

    pub fn location_columns(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.location.as_str())
    }

    pub fn date_columns(&self) -> impl Iterator<Item = &str> {
        self.slots
            .iter()
            .flat_map(|s| [s.start_date.as_str(), s.end_date.as_str()])
    }

    /// True for every column the candidate table carries.
    pub fn is_known_column(&self, name: &str) -> bool {
        self.specs.get(name).is_some()
    }
}

static DEFAULT_CATALOGUE: Lazy<Catalogue> = Lazy::new(build_default);

/// The process-wide read-only catalogue.
pub fn default_catalogue() -> &'static Catalogue {
    &DEFAULT_CATALOGUE
}

fn build_default() -> Catalogue {
    let mut specs = Vec::new();
    let mut groups = Vec::new();

    push_table(PERSONAL, FieldGroup::PersonalInformation, &mut specs, &mut groups);
    push_table(JOB_TITLES, FieldGroup::JobTitles, &mut specs, &mut groups);

    let slots: Vec<SlotColumns> = EMPLOYMENT_SLOTS
        .iter()
        .map(|(prefix, _)| SlotColumns::for_prefix(prefix))
        .collect();
    for ((_, ordinal), columns) in EMPLOYMENT_SLOTS.iter().zip(&slots) {
        let slot_specs = [
            FieldSpec::new(&columns.company)
                .label(&format!("{ordinal} Company Worked for"))
                .label(&format!("{ordinal} Company")),
            FieldSpec::new(&columns.start_date)
                .label(&format!("{ordinal} Start Date (YYYY-MM-DD)"))
                .label(&format!("{ordinal} Start Date")),
            FieldSpec::new(&columns.end_date)
                .label(&format!("{ordinal} End Date (YYYY-MM-DD)"))
                .label(&format!("{ordinal} End Date")),
            FieldSpec::new(&columns.location)
                .label(&format!("{ordinal} Job Location"))
                .label(&format!("{ordinal} Location")),
        ];
        for spec in slot_specs {
            groups.push((spec.name().to_string(), FieldGroup::WorkHistory));
            specs.push(spec);
        }
    }

    push_table(INDUSTRY, FieldGroup::Industry, &mut specs, &mut groups);
    push_table(TECHNICAL, FieldGroup::Technical, &mut specs, &mut groups);
    let skill_columns: Vec<String> = (1..=SKILL_COLUMN_COUNT)
        .map(|n| format!("Skill{n}"))
        .collect();
    for column in &skill_columns {
        specs.push(FieldSpec::new(column));
        groups.push((column.clone(), FieldGroup::Technical));
    }
    push_table(METRICS, FieldGroup::Metrics, &mut specs, &mut groups);

    Catalogue {
        specs: FieldSpecs::new(specs).expect("default catalogue has unique field names"),
        groups,
        slots,
        skill_columns,
    }
}

fn push_table(
    table: LabelTable,
    group: FieldGroup,
    specs: &mut Vec<FieldSpec>,
    groups: &mut Vec<(String, FieldGroup)>,
) {
    for (name, labels) in table {
        let spec = labels
            .iter()
            .fold(FieldSpec::new(*name), |spec, label| spec.label(label));
        specs.push(spec);
        groups.push((name.to_string(), group));
    }
}
