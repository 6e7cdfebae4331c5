//! Closed catalog of study field names accepted by the registry.
//!
//! These are the "piece" names the v2 API understands in its `fields`
//! parameter and in `/stats/fieldValues`. The list is static data: requests
//! are validated against it, nothing is derived from it.

use std::fmt;

/// Every field name accepted in a `fields` list, grouped by study module.
pub const STUDY_FIELDS: &[&str] = &[
    // Identification
    "NCTId", "NCTIdAlias", "OrgStudyIdInfo", "OrgStudyId", "OrgStudyIdType", "OrgStudyIdLink",
    "SecondaryIdInfo", "SecondaryId", "SecondaryIdType", "SecondaryIdDomain", "SecondaryIdLink",
    "BriefTitle", "OfficialTitle", "Acronym", "Organization", "OrgFullName", "OrgClass",
    // Status
    "StatusVerifiedDate", "OverallStatus", "LastKnownStatus", "DelayedPosting", "WhyStopped",
    "ExpandedAccessInfo", "HasExpandedAccess", "ExpandedAccessNCTId",
    "ExpandedAccessStatusForNCTId", "StartDateStruct", "StartDate", "StartDateType",
    "PrimaryCompletionDateStruct", "PrimaryCompletionDate", "PrimaryCompletionDateType",
    "CompletionDateStruct", "CompletionDate", "CompletionDateType", "StudyFirstSubmitDate",
    "StudyFirstSubmitQCDate", "StudyFirstPostDateStruct", "StudyFirstPostDate",
    "StudyFirstPostDateType", "ResultsWaived", "ResultsFirstSubmitDate",
    "ResultsFirstSubmitQCDate", "ResultsFirstPostDateStruct", "ResultsFirstPostDate",
    "ResultsFirstPostDateType", "DispFirstSubmitDate", "DispFirstSubmitQCDate",
    "DispFirstPostDateStruct", "DispFirstPostDate", "DispFirstPostDateType",
    "LastUpdateSubmitDate", "LastUpdatePostDateStruct", "LastUpdatePostDate",
    "LastUpdatePostDateType",
    // Sponsor / collaborators
    "ResponsibleParty", "ResponsiblePartyType", "ResponsiblePartyInvestigatorFullName",
    "ResponsiblePartyInvestigatorTitle", "ResponsiblePartyInvestigatorAffiliation",
    "ResponsiblePartyOldNameTitle", "ResponsiblePartyOldOrganization", "LeadSponsor",
    "LeadSponsorName", "LeadSponsorClass", "Collaborator", "CollaboratorName",
    "CollaboratorClass",
    // Oversight
    "OversightHasDMC", "IsFDARegulatedDrug", "IsFDARegulatedDevice", "IsUnapprovedDevice",
    "IsPPSD", "IsUSExport", "FDAAA801Violation",
    // Description
    "BriefSummary", "DetailedDescription",
    // Conditions
    "Condition", "Keyword",
    // Design
    "StudyType", "ExpandedAccessTypes", "ExpAccTypeIndividual", "ExpAccTypeIntermediate",
    "ExpAccTypeTreatment", "PatientRegistry", "TargetDuration", "Phase", "DesignInfo",
    "DesignAllocation", "DesignInterventionModel", "DesignInterventionModelDescription",
    "DesignPrimaryPurpose", "DesignObservationalModel", "DesignTimePerspective",
    "DesignMaskingInfo", "DesignMasking", "DesignMaskingDescription", "DesignWhoMasked",
    "BioSpec", "BioSpecRetention", "BioSpecDescription", "EnrollmentInfo", "EnrollmentCount",
    "EnrollmentType",
    // Arms / interventions
    "ArmGroup", "ArmGroupLabel", "ArmGroupType", "ArmGroupDescription",
    "ArmGroupInterventionName", "Intervention", "InterventionType", "InterventionName",
    "InterventionDescription", "InterventionArmGroupLabel", "InterventionOtherName",
    // Outcomes
    "PrimaryOutcome", "PrimaryOutcomeMeasure", "PrimaryOutcomeDescription",
    "PrimaryOutcomeTimeFrame", "SecondaryOutcome", "SecondaryOutcomeMeasure",
    "SecondaryOutcomeDescription", "SecondaryOutcomeTimeFrame", "OtherOutcome",
    "OtherOutcomeMeasure", "OtherOutcomeDescription", "OtherOutcomeTimeFrame",
    // Eligibility
    "EligibilityCriteria", "HealthyVolunteers", "Sex", "GenderBased", "GenderDescription",
    "MinimumAge", "MaximumAge", "StdAge", "StudyPopulation", "SamplingMethod",
    // Contacts / locations
    "CentralContact", "CentralContactName", "CentralContactRole", "CentralContactPhone",
    "CentralContactPhoneExt", "CentralContactEMail", "OverallOfficial", "OverallOfficialName",
    "OverallOfficialAffiliation", "OverallOfficialRole", "Location", "LocationFacility",
    "LocationStatus", "LocationCity", "LocationState", "LocationZip", "LocationCountry",
    "LocationContact", "LocationContactName", "LocationContactRole", "LocationContactPhone",
    "LocationContactPhoneExt", "LocationContactEMail", "LocationGeoPoint",
    // References
    "Reference", "ReferencePMID", "ReferenceType", "ReferenceCitation", "RetractionPMID",
    "RetractionSource", "SeeAlsoLink", "SeeAlsoLinkLabel", "SeeAlsoLinkURL", "AvailIPD",
    "AvailIPDId", "AvailIPDType", "AvailIPDURL", "AvailIPDComment",
    // IPD sharing
    "IPDSharing", "IPDSharingDescription", "IPDSharingInfoType", "IPDSharingTimeFrame",
    "IPDSharingAccessCriteria", "IPDSharingURL",
    // Participant flow
    "FlowPreAssignmentDetails", "FlowRecruitmentDetails", "FlowTypeUnitsAnalyzed", "FlowGroup",
    "FlowGroupId", "FlowGroupTitle", "FlowGroupDescription", "FlowPeriod", "FlowPeriodTitle",
    "FlowMilestone", "FlowMilestoneType", "FlowMilestoneComment", "FlowAchievement",
    "FlowAchievementGroupId", "FlowAchievementComment", "FlowAchievementNumSubjects",
    "FlowAchievementNumUnits", "FlowDropWithdraw", "FlowDropWithdrawType",
    "FlowDropWithdrawComment", "FlowReason", "FlowReasonGroupId", "FlowReasonComment",
    "FlowReasonNumSubjects",
    // Baseline characteristics
    "BaselinePopulationDescription", "BaselineTypeUnitsAnalyzed", "BaselineGroup",
    "BaselineGroupId", "BaselineGroupTitle", "BaselineGroupDescription", "BaselineDenom",
    "BaselineDenomUnits", "BaselineDenomCount", "BaselineDenomCountGroupId",
    "BaselineDenomCountValue", "BaselineMeasure", "BaselineMeasureTitle",
    "BaselineMeasureDescription", "BaselineMeasurePopulationDescription",
    "BaselineMeasureParamType", "BaselineMeasureDispersionType", "BaselineMeasureUnitOfMeasure",
    "BaselineMeasureCalculatePct", "BaselineMeasureDenomUnitsSelected", "BaselineClass",
    "BaselineClassTitle", "BaselineCategory", "BaselineCategoryTitle", "BaselineMeasurement",
    "BaselineMeasurementGroupId", "BaselineMeasurementValue", "BaselineMeasurementSpread",
    "BaselineMeasurementLowerLimit", "BaselineMeasurementUpperLimit",
    "BaselineMeasurementComment",
    // Outcome measures
    "OutcomeMeasure", "OutcomeMeasureType", "OutcomeMeasureTitle", "OutcomeMeasureDescription",
    "OutcomeMeasurePopulationDescription", "OutcomeMeasureReportingStatus",
    "OutcomeMeasureAnticipatedPostingDate", "OutcomeMeasureParamType",
    "OutcomeMeasureDispersionType", "OutcomeMeasureUnitOfMeasure", "OutcomeMeasureCalculatePct",
    "OutcomeMeasureTimeFrame", "OutcomeMeasureTypeUnitsAnalyzed",
    "OutcomeMeasureDenomUnitsSelected", "OutcomeGroup", "OutcomeGroupId", "OutcomeGroupTitle",
    "OutcomeGroupDescription", "OutcomeDenom", "OutcomeDenomUnits", "OutcomeDenomCount",
    "OutcomeDenomCountGroupId", "OutcomeDenomCountValue", "OutcomeClass", "OutcomeClassTitle",
    "OutcomeCategory", "OutcomeCategoryTitle", "OutcomeMeasurement",
    "OutcomeMeasurementGroupId", "OutcomeMeasurementValue", "OutcomeMeasurementSpread",
    "OutcomeMeasurementLowerLimit", "OutcomeMeasurementUpperLimit", "OutcomeMeasurementComment",
    "OutcomeAnalysis", "OutcomeAnalysisParamType", "OutcomeAnalysisParamValue",
    "OutcomeAnalysisDispersionType", "OutcomeAnalysisDispersionValue",
    "OutcomeAnalysisStatisticalMethod", "OutcomeAnalysisStatisticalComment",
    "OutcomeAnalysisPValue", "OutcomeAnalysisPValueComment", "OutcomeAnalysisCIPctValue",
    "OutcomeAnalysisCINumSides", "OutcomeAnalysisCILowerLimit", "OutcomeAnalysisCIUpperLimit",
    "OutcomeAnalysisCILowerLimitComment", "OutcomeAnalysisCIUpperLimitComment",
    "OutcomeAnalysisEstimateComment", "OutcomeAnalysisTestedNonInferiority",
    "OutcomeAnalysisNonInferiorityType", "OutcomeAnalysisNonInferiorityComment",
    "OutcomeAnalysisOtherAnalysisDescription", "OutcomeAnalysisGroupDescription",
    "OutcomeAnalysisGroupId",
    // Adverse events
    "EventsFrequencyThreshold", "EventsTimeFrame", "EventsDescription",
    "EventsAllCauseMortalityComment", "EventGroup", "EventGroupId", "EventGroupTitle",
    "EventGroupDescription", "EventGroupDeathsNumAffected", "EventGroupDeathsNumAtRisk",
    "EventGroupSeriousNumAffected", "EventGroupSeriousNumAtRisk", "EventGroupOtherNumAffected",
    "EventGroupOtherNumAtRisk", "SeriousEvent", "SeriousEventTerm", "SeriousEventOrganSystem",
    "SeriousEventSourceVocabulary", "SeriousEventAssessmentType", "SeriousEventNotes",
    "SeriousEventStats", "SeriousEventStatsGroupId", "SeriousEventStatsNumEvents",
    "SeriousEventStatsNumAffected", "SeriousEventStatsNumAtRisk", "OtherEvent",
    "OtherEventTerm", "OtherEventOrganSystem", "OtherEventSourceVocabulary",
    "OtherEventAssessmentType", "OtherEventNotes", "OtherEventStats", "OtherEventStatsGroupId",
    "OtherEventStatsNumEvents", "OtherEventStatsNumAffected", "OtherEventStatsNumAtRisk",
    // More info
    "LimitationsAndCaveats", "LimitationsAndCaveatsDescription", "CertainAgreement",
    "AgreementPISponsorEmployee", "AgreementRestrictionType", "AgreementRestrictiveAgreement",
    "AgreementOtherDetails", "PointOfContact", "PointOfContactTitle",
    "PointOfContactOrganization", "PointOfContactEMail", "PointOfContactPhone",
    "PointOfContactPhoneExt",
    // Annotations
    "UnpostedAnnotation", "UnpostedResponsibleParty", "UnpostedEvent", "UnpostedEventType",
    "UnpostedEventDate", "UnpostedEventDateUnknown", "ViolationAnnotation", "ViolationEvent",
    "ViolationEventType", "ViolationEventDescription", "ViolationEventCreationDate",
    "ViolationEventIssuedDate", "ViolationEventReleaseDate", "ViolationEventPostedDate",
    // Documents
    "NoSAP", "LargeDoc", "LargeDocTypeAbbrev", "LargeDocHasProtocol", "LargeDocHasSAP",
    "LargeDocHasICF", "LargeDocLabel", "LargeDocDate", "LargeDocUploadDate", "LargeDocFilename",
    "LargeDocSize",
    // Derived
    "VersionHolder", "RemovedCountry", "SubmissionTracking", "ConditionMeshTerm",
    "ConditionMeshId", "ConditionAncestorTerm", "ConditionAncestorId",
    "ConditionBrowseLeafName", "ConditionBrowseLeafId", "ConditionBrowseLeafRelevance",
    "ConditionBrowseBranchName", "ConditionBrowseBranchAbbrev", "InterventionMeshTerm",
    "InterventionMeshId", "InterventionAncestorTerm", "InterventionAncestorId",
    "InterventionBrowseLeafName", "InterventionBrowseLeafId", "InterventionBrowseLeafRelevance",
    "InterventionBrowseBranchName", "InterventionBrowseBranchAbbrev", "HasResults",
];

/// Returns true if `name` is in the catalog. Matching is case-sensitive.
pub fn is_known_field(name: &str) -> bool {
    STUDY_FIELDS.contains(&name)
}

/// A field name known to be in [`STUDY_FIELDS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StudyField(&'static str);

impl StudyField {
    /// Look `name` up in the catalog.
    pub fn parse(name: &str) -> Option<Self> {
        STUDY_FIELDS
            .iter()
            .copied()
            .find(|known| *known == name)
            .map(Self)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for StudyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Comma-join field names in caller order.
pub fn join_fields(fields: &[StudyField]) -> String {
    fields
        .iter()
        .map(StudyField::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn catalog_has_no_duplicates() {
        let unique: HashSet<&str> = STUDY_FIELDS.iter().copied().collect();
        assert_eq!(unique.len(), STUDY_FIELDS.len());
    }

    #[test]
    fn common_fields_are_known() {
        for name in ["NCTId", "BriefTitle", "OverallStatus", "Phase", "LocationCountry", "HasResults"] {
            assert!(is_known_field(name), "{name} should be in the catalog");
        }
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert!(StudyField::parse("Phase").is_some());
        assert!(StudyField::parse("phase").is_none());
        assert!(StudyField::parse("").is_none());
    }

    #[test]
    fn join_preserves_order() {
        let fields: Vec<StudyField> = ["Phase", "NCTId", "Sex"]
            .iter()
            .map(|n| StudyField::parse(n).unwrap())
            .collect();
        assert_eq!(join_fields(&fields), "Phase,NCTId,Sex");
    }
}
