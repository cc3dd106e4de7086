//! # Maven Manifest Model
//!
//! A [`Manifest`] is an in-memory `pom.xml`. The full document is kept as an
//! `xot` tree, so everything the model does not care about (dependencies,
//! repositories, root namespace attributes, comments) is written back
//! untouched. On top of the tree the module offers typed read-only views of
//! the parts the rewriter needs:
//!
//! ```text
//! project
//! ├── build
//! │   ├── plugins/plugin*                       PluginSite::Build
//! │   └── pluginManagement/plugins/plugin*      PluginSite::BuildPluginManagement
//! └── profiles/profile*
//!     └── build
//!         ├── pluginManagement/plugins/plugin*  PluginSite::ProfilePluginManagement
//!         └── plugins/plugin*                   PluginSite::ProfileBuild
//! ```
//!
//! Every container on these paths is optional. [`Manifest::plugin_lists`]
//! yields the plugin lists that do exist, in the fixed order above (profiles
//! in document order), so callers work against one sequence of plugin
//! declarations instead of four concrete paths. Repeated containers (two
//! `<build>` or `<executions>` elements, say) are all visited.
//!
//! Documents with a `<!DOCTYPE>` declaration are rejected with
//! [`Error::ManifestParse`] since `xot` does not process DTDs. The dependency
//! bootstrap of such a project fails and is logged; acquisition is unaffected.

mod properties;
mod rewrite;

pub use properties::Properties;
pub use rewrite::{neutralize, rewrite, Neutralized, RewriteOutcome, Scope};

use std::fmt;
use std::fs;
use std::path::Path;

use xot::{Node, Xot};

use crate::error::{Error, Result};

/// Where a plugin list lives in the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginSite {
    /// `project/build/plugins`
    Build,
    /// `project/build/pluginManagement/plugins`
    BuildPluginManagement,
    /// `project/profiles/profile[n]/build/pluginManagement/plugins`
    ProfilePluginManagement(usize),
    /// `project/profiles/profile[n]/build/plugins`
    ProfileBuild(usize),
}

impl fmt::Display for PluginSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginSite::Build => f.write_str("build/plugins"),
            PluginSite::BuildPluginManagement => f.write_str("build/pluginManagement/plugins"),
            PluginSite::ProfilePluginManagement(n) => {
                write!(f, "profiles/profile[{}]/build/pluginManagement/plugins", n)
            }
            PluginSite::ProfileBuild(n) => write!(f, "profiles/profile[{}]/build/plugins", n),
        }
    }
}

/// One `<plugins>` container that exists in the document.
#[derive(Debug, Clone)]
pub struct PluginList {
    pub site: PluginSite,
    /// `<id>` of the enclosing profile, for profile sites.
    pub profile_id: Option<String>,
    node: Node,
}

/// Read-only view of one `<plugin>` declaration.
#[derive(Debug, Clone)]
pub struct PluginDecl {
    pub site: PluginSite,
    pub profile_id: Option<String>,
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    /// Plugin-level `<configuration>`, if present.
    pub configuration: Option<Properties>,
    pub executions: Vec<ExecutionDecl>,
    node: Node,
}

/// Read-only view of one `<execution>` under a plugin.
#[derive(Debug, Clone)]
pub struct ExecutionDecl {
    pub id: Option<String>,
    pub configuration: Option<Properties>,
}

/// A parsed `pom.xml`.
pub struct Manifest {
    xot: Xot,
    document: Node,
    project: Node,
}

impl Manifest {
    /// Parses manifest text.
    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_at(text, Path::new("<inline>"))
    }

    /// Reads and parses the manifest at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::ManifestParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse_at(&text, path)
    }

    fn parse_at(text: &str, path: &Path) -> Result<Self> {
        let parse_error = |message: String| Error::ManifestParse {
            path: path.to_path_buf(),
            message,
        };

        if text.contains("<!DOCTYPE") {
            return Err(parse_error(
                "document type declarations (<!DOCTYPE>) are not supported".to_string(),
            ));
        }

        let mut xot = Xot::new();
        let document = xot.parse(text).map_err(|e| parse_error(e.to_string()))?;
        let project = xot
            .document_element(document)
            .map_err(|e| parse_error(e.to_string()))?;

        let manifest = Self {
            xot,
            document,
            project,
        };
        match manifest.local_name(project) {
            Some("project") => Ok(manifest),
            other => Err(parse_error(format!(
                "expected <project> root element, found <{}>",
                other.unwrap_or("?")
            ))),
        }
    }

    /// `<name>`, falling back to `<artifactId>`, of the project.
    pub fn project_name(&self) -> Option<String> {
        self.child_text(self.project, "name")
            .or_else(|| self.child_text(self.project, "artifactId"))
    }

    /// All existing plugin lists, in rewrite order.
    pub fn plugin_lists(&self) -> Vec<PluginList> {
        let mut lists = Vec::new();
        let mut push = |site: PluginSite, profile_id: Option<String>, nodes: Vec<Node>| {
            lists.extend(nodes.into_iter().map(|node| PluginList {
                site,
                profile_id: profile_id.clone(),
                node,
            }));
        };

        push(
            PluginSite::Build,
            None,
            self.descend(self.project, &["build", "plugins"]),
        );
        push(
            PluginSite::BuildPluginManagement,
            None,
            self.descend(self.project, &["build", "pluginManagement", "plugins"]),
        );

        let profiles = self.descend(self.project, &["profiles", "profile"]);
        for (index, profile) in profiles.into_iter().enumerate() {
            let id = self.child_text(profile, "id");
            push(
                PluginSite::ProfilePluginManagement(index),
                id.clone(),
                self.descend(profile, &["build", "pluginManagement", "plugins"]),
            );
            push(
                PluginSite::ProfileBuild(index),
                id,
                self.descend(profile, &["build", "plugins"]),
            );
        }

        lists
    }

    /// The `<plugin>` declarations of one list.
    pub fn plugins(&self, list: &PluginList) -> Vec<PluginDecl> {
        self.children_named(list.node, "plugin")
            .into_iter()
            .map(|plugin| PluginDecl {
                site: list.site,
                profile_id: list.profile_id.clone(),
                group_id: self.child_text(plugin, "groupId"),
                artifact_id: self.child_text(plugin, "artifactId"),
                configuration: self.configuration(plugin),
                executions: self
                    .executions(plugin)
                    .into_iter()
                    .map(|execution| ExecutionDecl {
                        id: self.child_text(execution, "id"),
                        configuration: self.configuration(execution),
                    })
                    .collect(),
                node: plugin,
            })
            .collect()
    }

    /// Every plugin declaration across all sites, in rewrite order.
    pub fn plugin_declarations(&self) -> Vec<PluginDecl> {
        self.plugin_lists()
            .iter()
            .flat_map(|list| self.plugins(list))
            .collect()
    }

    /// Serializes the document, root attributes included.
    pub fn to_xml(&self) -> Result<String> {
        self.serialize_at(Path::new("<inline>"))
    }

    /// Serializes the document to `path`.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let xml = self.serialize_at(path)?;
        fs::write(path, xml).map_err(|e| Error::ManifestSerialize {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn serialize_at(&self, path: &Path) -> Result<String> {
        self.xot
            .to_string(self.document)
            .map_err(|e| Error::ManifestSerialize {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
    }

    /// Removes the plugin-level `<configuration>` of `plugin`.
    ///
    /// Returns the keys that were dropped, or `None` if there was no block.
    fn remove_plugin_configuration(&mut self, plugin: &PluginDecl) -> Result<Option<Properties>> {
        self.remove_configuration(plugin.node)
    }

    /// Removes the `<configuration>` of every execution of `plugin`.
    fn remove_execution_configurations(
        &mut self,
        plugin: &PluginDecl,
    ) -> Result<Vec<(Option<String>, Properties)>> {
        let mut removed = Vec::new();
        for execution in self.executions(plugin.node) {
            let id = self.child_text(execution, "id");
            if let Some(props) = self.remove_configuration(execution)? {
                removed.push((id, props));
            }
        }
        Ok(removed)
    }

    /// Removes every `<configuration>` child of `owner`.
    fn remove_configuration(&mut self, owner: Node) -> Result<Option<Properties>> {
        let blocks = self.children_named(owner, "configuration");
        let props = self.decode_blocks(&blocks);
        for block in blocks {
            self.xot
                .remove(block)
                .map_err(|e| Error::ManifestSerialize {
                    path: Path::new("<inline>").to_path_buf(),
                    message: e.to_string(),
                })?;
        }
        Ok(props)
    }

    fn configuration(&self, owner: Node) -> Option<Properties> {
        self.decode_blocks(&self.children_named(owner, "configuration"))
    }

    /// Merges repeated blocks in document order, `None` when there are none.
    fn decode_blocks(&self, blocks: &[Node]) -> Option<Properties> {
        if blocks.is_empty() {
            return None;
        }
        Some(
            blocks
                .iter()
                .flat_map(|block| Properties::decode(&self.xot, *block))
                .collect(),
        )
    }

    fn executions(&self, plugin: Node) -> Vec<Node> {
        self.descend(plugin, &["executions", "execution"])
    }

    fn local_name(&self, node: Node) -> Option<&str> {
        self.xot
            .element(node)
            .map(|element| self.xot.local_name_str(element.name()))
    }

    fn children_named(&self, parent: Node, name: &str) -> Vec<Node> {
        self.xot
            .children(parent)
            .filter(|child| self.local_name(*child) == Some(name))
            .collect()
    }

    fn child(&self, parent: Node, name: &str) -> Option<Node> {
        self.xot
            .children(parent)
            .find(|child| self.local_name(*child) == Some(name))
    }

    /// Every node reached by following `path`, through repeated elements too.
    fn descend(&self, from: Node, path: &[&str]) -> Vec<Node> {
        path.iter().fold(vec![from], |nodes, name| {
            nodes
                .into_iter()
                .flat_map(|node| self.children_named(node, name))
                .collect()
        })
    }

    fn child_text(&self, parent: Node, name: &str) -> Option<String> {
        self.child(parent, name)
            .and_then(|node| self.xot.text_content_str(node))
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
    }
}

impl fmt::Debug for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manifest")
            .field("project", &self.project_name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POM: &str = r#"<project xmlns="http://maven.apache.org/POM/4.0.0" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="http://maven.apache.org/POM/4.0.0 http://maven.apache.org/xsd/maven-4.0.0.xsd">
  <modelVersion>4.0.0</modelVersion>
  <groupId>com.example</groupId>
  <artifactId>demo</artifactId>
  <build>
    <plugins>
      <plugin>
        <groupId>org.apache.maven.plugins</groupId>
        <artifactId>maven-compiler-plugin</artifactId>
        <configuration>
          <release>17</release>
        </configuration>
      </plugin>
    </plugins>
    <pluginManagement>
      <plugins>
        <plugin>
          <artifactId>maven-surefire-plugin</artifactId>
        </plugin>
      </plugins>
    </pluginManagement>
  </build>
  <profiles>
    <profile>
      <id>ci</id>
      <build>
        <plugins>
          <plugin>
            <artifactId>maven-jar-plugin</artifactId>
            <executions>
              <execution>
                <id>test-jar</id>
                <configuration>
                  <classifier>tests</classifier>
                </configuration>
              </execution>
            </executions>
          </plugin>
        </plugins>
        <pluginManagement>
          <plugins>
            <plugin>
              <artifactId>maven-site-plugin</artifactId>
            </plugin>
          </plugins>
        </pluginManagement>
      </build>
    </profile>
    <profile>
      <id>empty</id>
    </profile>
  </profiles>
</project>
"#;

    #[test]
    fn test_plugin_lists_in_fixed_order() {
        let manifest = Manifest::parse(POM).unwrap();
        let sites: Vec<PluginSite> = manifest.plugin_lists().iter().map(|l| l.site).collect();
        assert_eq!(
            sites,
            vec![
                PluginSite::Build,
                PluginSite::BuildPluginManagement,
                PluginSite::ProfilePluginManagement(0),
                PluginSite::ProfileBuild(0),
            ]
        );
    }

    #[test]
    fn test_plugin_declarations_views() {
        let manifest = Manifest::parse(POM).unwrap();
        let decls = manifest.plugin_declarations();
        let ids: Vec<&str> = decls
            .iter()
            .filter_map(|d| d.artifact_id.as_deref())
            .collect();
        assert_eq!(
            ids,
            vec![
                "maven-compiler-plugin",
                "maven-surefire-plugin",
                "maven-site-plugin",
                "maven-jar-plugin",
            ]
        );

        let compiler = &decls[0];
        assert_eq!(compiler.group_id.as_deref(), Some("org.apache.maven.plugins"));
        assert_eq!(
            compiler.configuration.as_ref().and_then(|c| c.get("release")),
            Some("17")
        );

        let jar = &decls[3];
        assert_eq!(jar.profile_id.as_deref(), Some("ci"));
        assert_eq!(jar.executions.len(), 1);
        assert_eq!(jar.executions[0].id.as_deref(), Some("test-jar"));
        assert_eq!(
            jar.executions[0]
                .configuration
                .as_ref()
                .and_then(|c| c.get("classifier")),
            Some("tests")
        );
    }

    #[test]
    fn test_project_name_falls_back_to_artifact_id() {
        let manifest = Manifest::parse(POM).unwrap();
        assert_eq!(manifest.project_name().as_deref(), Some("demo"));
    }

    #[test]
    fn test_manifest_without_build_has_no_lists() {
        let manifest =
            Manifest::parse("<project><artifactId>bare</artifactId></project>").unwrap();
        assert!(manifest.plugin_lists().is_empty());
        assert!(manifest.plugin_declarations().is_empty());
    }

    #[test]
    fn test_serialization_keeps_root_attributes() {
        let manifest = Manifest::parse(POM).unwrap();
        let xml = manifest.to_xml().unwrap();
        assert!(xml.contains("xmlns=\"http://maven.apache.org/POM/4.0.0\""));
        assert!(xml.contains("xsi:schemaLocation="));
    }

    #[test]
    fn test_parse_rejects_non_project_root() {
        let err = Manifest::parse("<settings/>").unwrap_err();
        assert!(matches!(err, Error::ManifestParse { .. }));
        assert!(err.to_string().contains("<settings>"));
    }

    #[test]
    fn test_parse_rejects_malformed_xml() {
        assert!(matches!(
            Manifest::parse("<project><build></project>"),
            Err(Error::ManifestParse { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_doctype_with_reason() {
        let pom = "<?xml version=\"1.0\"?>\n<!DOCTYPE project>\n<project><artifactId>a</artifactId></project>";
        let err = Manifest::parse(pom).unwrap_err();
        assert!(matches!(err, Error::ManifestParse { .. }));
        assert!(err.to_string().contains("<!DOCTYPE>"), "{err}");
    }

    #[test]
    fn test_site_display() {
        assert_eq!(PluginSite::Build.to_string(), "build/plugins");
        assert_eq!(
            PluginSite::ProfileBuild(2).to_string(),
            "profiles/profile[2]/build/plugins"
        );
    }
}
