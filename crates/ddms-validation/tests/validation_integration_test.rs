//! Integration tests for ddms-validation crate
//!
//! These tests drive the vocabulary index and attribute groups through a
//! session, the way concrete components use them.

use ddms_ir::parse_str;
use ddms_validation::attributes::{NoticeAttributes, SecurityAttributes, SrsAttributes};
use ddms_validation::{Config, Error, Session, Version};

const SECURITY_3_1: &str = r#"<ddms:title xmlns:ddms="http://metadata.dod.mil/mdr/ns/DDMS/3.1/"
    xmlns:ISM="urn:us:gov:ic:ism"
    ISM:classification="S" ISM:ownerProducer="USA AUS"
    ISM:atomicEnergyMarkings="RD FRD-SG-12" ISM:SCIcontrols="SI-ECI-ABC"
    ISM:declassDate="2040-01-01">Title</ddms:title>"#;

#[test]
fn test_vocabulary_membership_across_versions() -> anyhow::Result<()> {
    let session = Session::with_defaults()?;
    let vocabulary = session.vocabulary();

    assert!(vocabulary.contains("atomic-energy-markings", "RD-SG-1", Version::V3_1)?);
    assert!(vocabulary.contains("atomic-energy-markings", "RD-SG-99", Version::V5_0)?);
    assert!(!vocabulary.contains("atomic-energy-markings", "RD-SG-100", Version::V5_0)?);

    let err = vocabulary
        .contains("atomic-energy-markings", "RD", Version::V3_0)
        .unwrap_err();
    assert!(matches!(err, Error::Argument(_)));
    assert!(err.to_string().starts_with("No controlled vocabulary could be found"));
    Ok(())
}

#[test]
fn test_unknown_vocabulary_key() -> anyhow::Result<()> {
    let session = Session::for_version("5.0")?;
    let err = session.vocabulary().tokens_for("favorite-colors", Version::V5_0).unwrap_err();
    assert_eq!(
        err.to_string(),
        "No controlled vocabulary could be found for this key: favorite-colors"
    );
    Ok(())
}

#[test]
fn test_security_attributes_from_parsed_element() -> anyhow::Result<()> {
    let doc = parse_str(SECURITY_3_1)?;
    let mut session = Session::with_defaults()?;
    assert_eq!(session.set_version_from_element(&doc.root)?, Version::V3_1);

    let attributes = SecurityAttributes::from_element(&session, &doc.root)?;
    assert_eq!(attributes.classification().as_deref(), Some("S"));
    assert_eq!(attributes.owner_producers(), vec!["USA", "AUS"]);
    assert_eq!(attributes.get("atomicEnergyMarkings").as_deref(), Some("RD FRD-SG-12"));
    attributes.require_classification()?;
    Ok(())
}

#[test]
fn test_same_markings_rejected_under_older_version() -> anyhow::Result<()> {
    let doc = parse_str(SECURITY_3_1)?;
    // read the 3.1 document while the session is pinned to 3.0: the ISM
    // namespace is shared, so the attributes are found and then rejected
    let session = Session::for_version("3.0")?;
    let err = SecurityAttributes::from_element(&session, &doc.root).unwrap_err();
    assert_eq!(
        err.to_string(),
        "The ISM:atomicEnergyMarkings attribute cannot be used until DDMS 3.1 or later."
    );
    Ok(())
}

#[test]
fn test_equality_is_order_independent_for_token_sets() -> anyhow::Result<()> {
    let session = Session::for_version("4.1")?;
    let a = SecurityAttributes::with_classification(&session, "U", &["USA", "GBR"])?;
    let b = SecurityAttributes::with_classification(&session, "U", &["GBR", "USA"])?;
    assert_eq!(a, b);

    let c = SecurityAttributes::with_classification(&session, "C", &["GBR", "USA"])?;
    assert_ne!(a, c);
    Ok(())
}

#[test]
fn test_notice_and_srs_groups() -> anyhow::Result<()> {
    let session = Session::for_version("4.1")?;
    let notice = NoticeAttributes::new(&session, [("noticeType", "DoD-Dist-B"), ("noticeDate", "2011-09-15")])?;
    assert!(!notice.is_empty());

    let srs = SrsAttributes::new(&session, [("srsName", "urn:srs"), ("srsDimension", "3")])?;
    assert_eq!(srs.srs_dimension(), Some(3));

    let older = Session::for_version("3.0")?;
    assert!(NoticeAttributes::new(&older, [("noticeType", "DoD-Dist-B")]).is_err());
    Ok(())
}

#[test]
fn test_restricted_registry() -> anyhow::Result<()> {
    let session = Session::new(Config::new().supported_versions(["4.1", "5.0"]))?;
    assert!(session.with_version("3.1").is_err());
    assert!(session.vocabulary().keys(Version::V3_1).is_empty());
    Ok(())
}
