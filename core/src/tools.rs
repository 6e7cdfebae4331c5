//! Descriptors for the three operations as published to tool hosts.

use schemars::{schema_for, JsonSchema};
use serde::Serialize;
use serde_json::Value;

use crate::types::{GetFieldValuesInput, GetStudyInput, SearchStudiesInput};

pub const GET_STUDY: &str = "clinicaltrials_get_study";
pub const SEARCH_STUDIES: &str = "clinicaltrials_search_studies";
pub const GET_FIELD_VALUES: &str = "clinicaltrials_get_field_values";

/// The three operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    GetStudy,
    SearchStudies,
    GetFieldValues,
}

impl ToolKind {
    pub const ALL: [ToolKind; 3] = [Self::GetStudy, Self::SearchStudies, Self::GetFieldValues];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::GetStudy => GET_STUDY,
            Self::SearchStudies => SEARCH_STUDIES,
            Self::GetFieldValues => GET_FIELD_VALUES,
        }
    }

    pub const fn title(&self) -> &'static str {
        match self {
            Self::GetStudy => "Get Clinical Study by NCT ID",
            Self::SearchStudies => "Search Clinical Studies",
            Self::GetFieldValues => "Get Field Value Distributions",
        }
    }

    /// Text shown to the model choosing a tool: arguments, response shape
    /// and when (not) to use it.
    pub const fn description(&self) -> &'static str {
        match self {
            Self::GetStudy => GET_STUDY_DESCRIPTION,
            Self::SearchStudies => SEARCH_STUDIES_DESCRIPTION,
            Self::GetFieldValues => GET_FIELD_VALUES_DESCRIPTION,
        }
    }

    /// JSON schema of the operation's input.
    pub fn input_schema(&self) -> Value {
        match self {
            Self::GetStudy => schema_value::<GetStudyInput>(),
            Self::SearchStudies => schema_value::<SearchStudiesInput>(),
            Self::GetFieldValues => schema_value::<GetFieldValuesInput>(),
        }
    }

    pub fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name(),
            description: self.description(),
            annotations: ToolAnnotations::read_only(self.title()),
            input_schema: self.input_schema(),
        }
    }
}

/// Behavioural hints attached to every operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolAnnotations {
    pub title: &'static str,
    pub read_only_hint: bool,
    pub destructive_hint: bool,
    pub idempotent_hint: bool,
    pub open_world_hint: bool,
}

impl ToolAnnotations {
    /// Read-only, non-destructive, idempotent, talks to an outside service.
    pub const fn read_only(title: &'static str) -> Self {
        Self {
            title,
            read_only_hint: true,
            destructive_hint: false,
            idempotent_hint: true,
            open_world_hint: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub annotations: ToolAnnotations,
    pub input_schema: Value,
}

pub fn catalog() -> Vec<ToolDescriptor> {
    ToolKind::ALL.iter().map(ToolKind::descriptor).collect()
}

pub fn descriptor(name: &str) -> Option<ToolDescriptor> {
    ToolKind::from_name(name).map(|kind| kind.descriptor())
}

fn schema_value<T: JsonSchema>() -> Value {
    schema_for!(T).to_value()
}

const GET_STUDY_DESCRIPTION: &str = "Retrieve a single clinical study record from ClinicalTrials.gov by its NCT identifier.\n\
     \n\
     Fetches the full study record, or only the requested fields, from the ClinicalTrials.gov v2 API.\n\
     \n\
     Arguments:\n\
     - nct_id: NCT identifier such as 'NCT00000102'. Case-insensitive; must match NCT followed by digits.\n\
     - format: 'json' (default) or 'csv'.\n\
     - markup_format: 'markdown' (default) or 'legacy' for rich-text fields.\n\
     - fields: list of field names to include, e.g. [\"NCTId\", \"BriefTitle\", \"OverallStatus\", \"Phase\"]. Omit to return every field.\n\
     \n\
     Returns the study as pretty-printed JSON or as CSV text. JSON records have the top-level keys \"protocolSection\" (identificationModule, statusModule, descriptionModule, conditionsModule, designModule, eligibilityModule, contactsLocationsModule, ...), \"derivedSection\" and \"hasResults\".\n\
     \n\
     Failures come back as text starting with 'Error:', for example:\n\
     - \"Error: Study not found. Verify the NCT ID is correct.\"\n\
     - \"Error: Rate limit exceeded. Please wait before retrying.\"\n\
     - \"Error: Request timed out. Please try again.\"\n\
     \n\
     Examples:\n\
     - \"Get full details for NCT00000102\" -> nct_id='NCT00000102'\n\
     - \"What is the status and phase of study NCT04280705?\" -> nct_id='NCT04280705', fields=[\"NCTId\", \"OverallStatus\", \"Phase\"]\n\
     - Not for searching by condition or sponsor; use clinicaltrials_search_studies.";

const SEARCH_STUDIES_DESCRIPTION: &str = "Search for clinical studies on ClinicalTrials.gov by condition, intervention, sponsor, location and more.\n\
     \n\
     Returns one page of matching studies. At least one query_* parameter or filter_ids must be provided.\n\
     \n\
     Query parameters:\n\
     - query_cond: condition or disease, e.g. 'diabetes'.\n\
     - query_term: general keywords, e.g. 'mRNA vaccine'.\n\
     - query_intr: intervention name, e.g. 'insulin'.\n\
     - query_titles: words in study titles only.\n\
     - query_id: study ID or NCT number.\n\
     - query_spons: sponsor or collaborator, e.g. 'NIH'.\n\
     - query_locn: location terms, e.g. 'Boston'.\n\
     - query_patient: plain-language patient search.\n\
     \n\
     Filters:\n\
     - filter_overall_status: list of recruitment statuses such as RECRUITING or COMPLETED.\n\
     - filter_geo: geographic radius, e.g. 'distance(39.0,-77.0,50mi)'.\n\
     - filter_ids: list of NCT IDs to retrieve.\n\
     - post_filter_overall_status, post_filter_geo: the same filters applied after aggregation.\n\
     - agg_filters: aggregation filter expression, e.g. 'phase:2 3,studyType:int'.\n\
     \n\
     Sorting and paging:\n\
     - sort: field and direction, e.g. 'LastUpdatePostDate:desc'.\n\
     - page_size: results per page, 1 to 1000 (default 20).\n\
     - page_token: the 'nextPageToken' of a previous response.\n\
     - count_total: include 'totalCount' in the response (default false).\n\
     \n\
     Output: format ('json' or 'csv'), markup_format ('markdown' or 'legacy') and fields (list of field names).\n\
     \n\
     JSON responses look like {\"totalCount\": int (only with count_total), \"studies\": [{\"protocolSection\": {...}}, ...], \"nextPageToken\": str (when more pages exist)}. Failures come back as text starting with 'Error:', such as \"Error: Bad request — check your parameters.\"\n\
     \n\
     Examples:\n\
     - \"Find recruiting Phase 3 diabetes trials\" -> query_cond='diabetes', filter_overall_status=[\"RECRUITING\"], agg_filters='phase:3'\n\
     - \"NIH-sponsored cancer studies updated recently\" -> query_cond='cancer', query_spons='NIH', sort='LastUpdatePostDate:desc'\n\
     - \"Trials near Boston for asthma\" -> query_cond='asthma', filter_geo='distance(42.36,-71.06,25mi)'\n\
     - \"Details for NCT04280705 and NCT00000102\" -> filter_ids=[\"NCT04280705\", \"NCT00000102\"]\n\
     - Not for a single known NCT ID; use clinicaltrials_get_study.";

const GET_FIELD_VALUES_DESCRIPTION: &str = "Get the distribution of values across all studies for one or more fields.\n\
     \n\
     Reports how many studies carry each distinct value of the requested fields. Works best with enumerable fields such as Phase, OverallStatus, StudyType, Sex, StdAge, LeadSponsorClass, InterventionType, LocationCountry, DesignAllocation, DesignPrimaryPurpose, DesignMasking, IsFDARegulatedDrug, HasResults and IPDSharing; free-text fields only report their most frequent values.\n\
     \n\
     Arguments:\n\
     - fields: one or more field names (at least one).\n\
     \n\
     Returns a JSON array with one element per field: {\"type\": \"ENUM\" or \"STRING\", \"piece\": field name, \"field\": JSON path in the study record, \"missingStudiesCount\": int, \"uniqueValuesCount\": int, \"topValues\": [{\"value\": str, \"studiesCount\": int}, ...]}. Failures come back as text starting with 'Error:'.\n\
     \n\
     Examples:\n\
     - \"How many studies are in each phase?\" -> fields=[\"Phase\"]\n\
     - \"Breakdown of recruiting status and study type?\" -> fields=[\"OverallStatus\", \"StudyType\"]\n\
     - \"Which countries have the most trial locations?\" -> fields=[\"LocationCountry\"]\n\
     - Not for full study records; use clinicaltrials_search_studies.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lists_three_read_only_tools() {
        let tools = catalog();
        let names: Vec<&str> = tools.iter().map(|t| t.name).collect();
        assert_eq!(names, [GET_STUDY, SEARCH_STUDIES, GET_FIELD_VALUES]);
        for tool in &tools {
            assert!(tool.annotations.read_only_hint);
            assert!(!tool.annotations.destructive_hint);
            assert!(tool.annotations.idempotent_hint);
            assert!(tool.annotations.open_world_hint);
        }
    }

    #[test]
    fn names_round_trip() {
        for kind in ToolKind::ALL {
            assert_eq!(ToolKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(ToolKind::from_name("clinicaltrials_delete_study"), None);
        assert!(descriptor("nope").is_none());
    }

    #[test]
    fn schemas_forbid_extra_properties() {
        for kind in ToolKind::ALL {
            let schema = kind.input_schema();
            assert_eq!(schema["additionalProperties"], Value::Bool(false), "{}", kind.name());
        }
    }

    #[test]
    fn schema_marks_required_inputs() {
        let schema = ToolKind::GetStudy.input_schema();
        assert_eq!(schema["required"], serde_json::json!(["nct_id"]));
        assert!(schema["properties"]["fields"].is_object());

        let schema = ToolKind::GetFieldValues.input_schema();
        assert_eq!(schema["required"], serde_json::json!(["fields"]));
    }

    #[test]
    fn descriptor_serializes_in_camel_case() {
        let json = serde_json::to_value(ToolKind::SearchStudies.descriptor()).unwrap();
        assert_eq!(json["annotations"]["readOnlyHint"], true);
        assert_eq!(json["annotations"]["title"], "Search Clinical Studies");
        assert!(json["inputSchema"]["properties"]["page_size"].is_object());
    }
}
