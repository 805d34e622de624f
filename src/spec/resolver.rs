//! Fragment inheritance: merging ancestor documentation into one template

use super::class::{Fragment, SpecClass};
use super::CONTEXT;

/// Source of the templates a spec renders
pub trait TemplateProvider {
    /// Ancestor fragments with their declaring class, most general first
    fn ancestor_fragments(&self) -> Vec<(&'static SpecClass, Fragment)>;

    /// The leaf's own fragment
    fn instance_fragment(&self) -> Option<Fragment>;

    /// Ancestor fragments joined by a blank line
    fn merged_template(&self) -> String {
        self.ancestor_fragments()
            .iter()
            .map(|(_, fragment)| fragment.cleaned())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// The leaf's cleaned fragment, empty when it has none
    fn instance_notes(&self) -> String {
        self.instance_fragment()
            .map(|fragment| fragment.cleaned())
            .unwrap_or_default()
    }
}

impl TemplateProvider for &'static SpecClass {
    fn ancestor_fragments(&self) -> Vec<(&'static SpecClass, Fragment)> {
        let mut fragments: Vec<_> = self
            .ancestors()
            .take_while(|class| !class.is(&CONTEXT))
            .filter_map(|class| class.doc.map(|doc| (class, doc)))
            .collect();
        fragments.reverse();
        fragments
    }

    fn instance_fragment(&self) -> Option<Fragment> {
        self.doc
    }
}
