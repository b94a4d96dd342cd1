use std::path::{Path, PathBuf};

pub const NS: &str = r#"xmlns="http://www.prorail.nl/IMSpoor""#;

/// Single-file project with an initial and a new situation.
#[allow(dead_code)]
pub fn project_xml(initial_name: &str, new_name: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Project {NS} imxVersion="5.0.0">
  <Metadata>
    <Note>two situations</Note>
  </Metadata>
  <InitialSituation>
    <RailInfrastructure>
      <Signal puic="s1" name="{initial_name}">
        <Location>
          <GeographicLocation accuracy="0.1">
            <Point><coordinates>1,2</coordinates></Point>
          </GeographicLocation>
        </Location>
      </Signal>
    </RailInfrastructure>
  </InitialSituation>
  <NewSituation>
    <RailInfrastructure>
      <Signal puic="s1" name="{new_name}"/>
      <Signal puic="s2" name="added"/>
    </RailInfrastructure>
  </NewSituation>
</Project>"#
    )
}

#[allow(dead_code)]
pub fn signaling_design_xml(version: &str, rc_name: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<SignalingDesign {NS} imxVersion="{version}">
  <Junction puic="jA"><Location><GeographicLocation><Point><coordinates>0,0</coordinates></Point></GeographicLocation></Location></Junction>
  <Junction puic="jB"><Location><GeographicLocation><Point><coordinates>10,0</coordinates></Point></GeographicLocation></Location></Junction>
  <Track puic="t1"><Location><GeographicLocation><LineString><coordinates>0,0 10,0</coordinates></LineString></GeographicLocation></Location></Track>
  <RailConnection puic="rc1" name="{rc_name}" trackRef="t1"/>
</SignalingDesign>"#
    )
}

#[allow(dead_code)]
pub fn network_xml(version: &str, parent_hash: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<RailwayNetworkConfiguration {NS} imxVersion="{version}">
  <BaseReference parentDocumentName="SignalingDesign.xml" parentHashcode="{parent_hash}"/>
  <MicroLink implementationObjectRef="rc1">
    <FromMicroNode nodeRef="jA"/>
    <ToMicroNode nodeRef="jB"/>
  </MicroLink>
</RailwayNetworkConfiguration>"#
    )
}

#[allow(dead_code)]
pub fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}
