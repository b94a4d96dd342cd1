use imxdiff_core::{
    CanonicalConfig, ContainerId, DocumentIdentity, IngestContext, PlanarGeometry, Record,
    ReferenceConfig, Repository,
};

pub const SCHEMA_VERSION: &str = "12.0.0";
pub const CORE_HASH: &str = "0a1b2c";

/// A `GeographicLocation` record with one shape.
#[allow(dead_code)]
pub fn location(shape: &str, coordinates: &str) -> Record {
    Record::new("Location").with_child(
        Record::new("GeographicLocation").with_child(
            Record::new(shape).with_child(Record::new("coordinates").with_text(coordinates)),
        ),
    )
}

#[allow(dead_code)]
pub fn signal(puic: &str, name: &str) -> Record {
    Record::new("Signal")
        .with_attr("puic", puic)
        .with_attr("name", name)
}

/// Core design document: two junctions, a track, a passage and a rail
/// connection running over both.
#[allow(dead_code)]
pub fn core_document() -> Record {
    Record::new("SignalingDesign")
        .with_attr("imxVersion", SCHEMA_VERSION)
        .with_child(
            Record::new("Junction")
                .with_attr("puic", "jA")
                .with_attr("name", "A")
                .with_child(location("Point", "0,0")),
        )
        .with_child(
            Record::new("Junction")
                .with_attr("puic", "jB")
                .with_attr("name", "B")
                .with_child(location("Point", "10,0")),
        )
        .with_child(
            Record::new("Track")
                .with_attr("puic", "t1")
                .with_child(location("LineString", "10,0 5,0")),
        )
        .with_child(
            Record::new("Passage")
                .with_attr("puic", "p1")
                .with_child(location("LineString", "5,0 0,0")),
        )
        .with_child(
            Record::new("RailConnection")
                .with_attr("puic", "rc1")
                .with_attr("name", "RC1")
                .with_attr("trackRef", "t1")
                .with_attr("passageRefs", "p1"),
        )
        .with_child(signal("s1", "S1"))
}

/// Topology document extending the core document's rail connection.
#[allow(dead_code)]
pub fn topology_document() -> Record {
    Record::new("RailwayNetworkConfiguration").with_child(
        Record::new("MicroLink")
            .with_attr("implementationObjectRef", "rc1")
            .with_child(Record::new("FromMicroNode").with_attr("nodeRef", "jA"))
            .with_child(Record::new("ToMicroNode").with_attr("nodeRef", "jB")),
    )
}

#[allow(dead_code)]
pub fn core_identity() -> DocumentIdentity {
    DocumentIdentity::new(CORE_HASH, SCHEMA_VERSION).with_name("SignalingDesign.xml")
}

#[allow(dead_code)]
pub fn topology_identity(base_hash: &str) -> DocumentIdentity {
    DocumentIdentity::new("9f8e7d", SCHEMA_VERSION)
        .with_base_hash(base_hash)
        .with_name("RailwayNetworkConfiguration.xml")
}

/// Container of the core and topology documents with geometry assembly.
#[allow(dead_code)]
pub fn design_container(id: &str) -> Repository {
    let canonical = CanonicalConfig::default();
    let references = ReferenceConfig::builtin();
    let ctx = IngestContext::new(&canonical, &references).with_geometry(&PlanarGeometry);
    let core = core_document();
    let topology = topology_document();
    Repository::ingest(
        ContainerId::from_string(id),
        &[
            (&core, core_identity()),
            (&topology, topology_identity(CORE_HASH)),
        ],
        &ctx,
    )
    .unwrap()
}

/// Single-document container holding the given signals.
#[allow(dead_code)]
pub fn signal_container(id: &str, version: &str, signals: &[(&str, &str)]) -> Repository {
    let mut root = Record::new("Situation");
    for (puic, name) in signals {
        root = root.with_child(signal(puic, name));
    }
    let canonical = CanonicalConfig::default();
    let references = ReferenceConfig::builtin();
    Repository::ingest(
        ContainerId::from_string(id),
        &[(&root, DocumentIdentity::new(format!("hash-{id}"), version))],
        &IngestContext::new(&canonical, &references),
    )
    .unwrap()
}
