//! Stock specification classes
//!
//! Documents derive from these the way sample namespaces do: declare a static
//! whose `parent` is one of the classes below and provide any accessor the
//! inherited templates reference.

use crate::value::Value;

use super::class::{Accessor, SpecClass};
use super::context::declared_fields;
use super::{Spec, SpecError};

/// Root marker; fragment inheritance stops here
pub static CONTEXT: SpecClass = SpecClass::base("Context", module_path!(), crate::location!());

fn type_name(spec: &Spec) -> Result<Value, SpecError> {
    Ok(Value::from(spec.type_name()))
}

fn qualified_name(spec: &Spec) -> Result<Value, SpecError> {
    Ok(Value::from(spec.qualified_name()))
}

fn leaf_doc(spec: &Spec) -> Result<Value, SpecError> {
    Ok(Value::from(spec.notes()))
}

fn fields(spec: &Spec) -> Result<Value, SpecError> {
    Ok(declared_fields(spec.class()))
}

fn no_constraints(_: &Spec) -> Result<Value, SpecError> {
    Ok(Value::List(Vec::new()))
}

fn methods(spec: &Spec) -> Result<Value, SpecError> {
    spec.methods()
}

pub static FEATURE: SpecClass = SpecClass {
    parent: Some(&CONTEXT),
    doc: Some(crate::fragment!(
        r"
        Feature Specification: {{feature_name}}
        Feature Branch: [feat-{{feature_name}}]
        "
    )),
    accessors: &[Accessor::new("feature_name", type_name)],
    ..SpecClass::base("Feature", module_path!(), crate::location!())
};

pub static DEF: SpecClass = SpecClass {
    parent: Some(&CONTEXT),
    doc: Some(crate::fragment!("Definition: {{name}}:")),
    accessors: &[Accessor::new("name", qualified_name)],
    ..SpecClass::base("Def", module_path!(), crate::location!())
};

pub static EDGE_CASE: SpecClass = SpecClass {
    parent: Some(&CONTEXT),
    doc: Some(crate::fragment!(
        r"
        Edge Case

        What happens when {{boundary_condition}}?
        How does system handle {{error_scenario}}?
        "
    )),
    accessors: &[
        Accessor::unimplemented("boundary_condition"),
        Accessor::unimplemented("error_scenario"),
    ],
    ..SpecClass::base("EdgeCase", module_path!(), crate::location!())
};

pub static CONSTRAINT: SpecClass = SpecClass {
    parent: Some(&CONTEXT),
    doc: Some(crate::fragment!(
        r"
        CONSTRAINT-ID: {{constraint_id}}
        DESCRIPTION: {{description}}
        ENFORCEMENT: {{enforcement_logic}}
        "
    )),
    accessors: &[
        Accessor::new("constraint_id", type_name),
        Accessor::new("description", leaf_doc),
        Accessor::unimplemented("enforcement_logic"),
    ],
    ..SpecClass::base("Constraint", module_path!(), crate::location!())
};

pub static REQUIREMENT: SpecClass = SpecClass {
    parent: Some(&CONTEXT),
    doc: Some(crate::fragment!(
        r"
        Requirement
        TITLE: {{title}}
        REQUIREMENT-ID: {{req_id}}
        "
    )),
    accessors: &[
        Accessor::new("title", type_name),
        Accessor::new("req_id", qualified_name),
    ],
    ..SpecClass::base("Requirement", module_path!(), crate::location!())
};

pub static SYSTEM_REQUIREMENT: SpecClass = SpecClass {
    parent: Some(&REQUIREMENT),
    doc: Some(crate::fragment!(
        r"
        System Requirement: This is a tool level requirement aimed at the
        toolchain supporting the project.
        "
    )),
    ..SpecClass::base("SystemRequirement", module_path!(), crate::location!())
};

pub static IMPLEMENTATION: SpecClass = SpecClass {
    parent: Some(&REQUIREMENT),
    doc: Some(crate::fragment!(
        r"
        Implementation requirements.
        Implementations must include tests.

        All files generated by this implementation should live in the
        directory: {{implementation_directory}}
        "
    )),
    accessors: &[Accessor::unimplemented("implementation_directory")],
    ..SpecClass::base("Implementation", module_path!(), crate::location!())
};

pub static DATA_SCHEMA: SpecClass = SpecClass {
    parent: Some(&CONTEXT),
    doc: Some(crate::fragment!(
        r"
        DATA-MODEL: {{model_name}}
        FIELDS:
        {% if fields is mapping %}
        {% for name, type_obj in fields.items() %}
          - {{name}}: {{type_obj}}
        {% endfor %}
        {% else %}
          - No fields defined.
        {% endif %}
        "
    )),
    accessors: &[
        Accessor::new("model_name", type_name),
        Accessor::new("fields", fields),
    ],
    ..SpecClass::base("DataSchema", module_path!(), crate::location!())
};

pub static SQLITE3: SpecClass = SpecClass {
    parent: Some(&DATA_SCHEMA),
    doc: Some(crate::fragment!(
        r"
        SQLite3 Database.

        The following schema should be implemented for SQLite3. Write
        tests to ensure the database behaves as expected.

        The database file should be located at {{dbpath}}
        "
    )),
    accessors: &[Accessor::unimplemented("dbpath")],
    ..SpecClass::base("SQLite3", module_path!(), crate::location!())
};

pub static PEEWEE: SpecClass = SpecClass {
    parent: Some(&DATA_SCHEMA),
    doc: Some(crate::fragment!(
        r"
        Python PeeWee Database.

        The following schema should be implemented for PeeWee. Write
        tests to ensure the database behaves as expected.

        The database file should be located at {{dbpath}}
        "
    )),
    accessors: &[Accessor::unimplemented("dbpath")],
    ..SpecClass::base("PeeWee", module_path!(), crate::location!())
};

pub static API: SpecClass = SpecClass {
    parent: Some(&CONTEXT),
    doc: Some(crate::fragment!(
        r"
        API Specification: {{api_name}}

        Endpoints:
        {% for method in methods %}
          - {{method.name}}({{method.params|join(', ')}})

            Description: {{method.description}}
        {% endfor %}

        Constraints:
        {% for constraint in constraints %}
          - {{constraint}}
        {% endfor %}
        "
    )),
    accessors: &[
        Accessor::new("api_name", type_name),
        Accessor::new("constraints", no_constraints),
        Accessor::new("methods", methods),
    ],
    ..SpecClass::base("API", module_path!(), crate::location!())
};

pub static LIBRARY_API: SpecClass = SpecClass {
    parent: Some(&API),
    doc: Some(crate::fragment!(
        r"
        Library API Version: {{version}}
        This is not a network API, rather this is a library API.
        "
    )),
    accessors: &[Accessor::unimplemented("version")],
    ..SpecClass::base("LibraryAPI", module_path!(), crate::location!())
};

pub static REST_API: SpecClass = SpecClass {
    parent: Some(&API),
    doc: Some(crate::fragment!(
        "Develop a REST API with best practices around this interface"
    )),
    ..SpecClass::base("RestAPI", module_path!(), crate::location!())
};

pub static CMD_LINE: SpecClass = SpecClass {
    parent: Some(&CONTEXT),
    doc: Some(crate::fragment!(
        r"
        Command Line Specification

        implement these commands:
        {% for method in methods %}
          | {{method.name}}({{method.params|join(', ')}})
          | Description: {{method.description}}
          | {{method.result}}
        {% endfor %}
        "
    )),
    accessors: &[Accessor::new("methods", methods)],
    ..SpecClass::base("CmdLine", module_path!(), crate::location!())
};

pub static USER_STORY: SpecClass = SpecClass {
    parent: Some(&FEATURE),
    doc: Some(crate::fragment!(
        r#"
        User Story - {{brief-title}} (Priority: {{priority}})

        {{user-journey}}

        Why this priority: {{explanation}}

        Independent Test: [Describe how this can be tested independently -
        e.g., "Can be fully tested by [specific action] and delivers
        [specific value]"]

        Acceptance Scenarios:

        Given [initial state], When [action], Then [expected outcome]
        "#
    )),
    accessors: &[
        Accessor::unimplemented("brief_title"),
        Accessor::unimplemented("priority"),
        Accessor::unimplemented("user_journey"),
        Accessor::unimplemented("explanation"),
    ],
    ..SpecClass::base("UserStory", module_path!(), crate::location!())
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{Field, MethodDecl};
    use pretty_assertions::assert_eq;

    fn balance(_: &Spec) -> Result<Value, SpecError> {
        Ok(Value::Int(100))
    }

    static SCHEMA: SpecClass = SpecClass {
        parent: Some(&DATA_SCHEMA),
        fields: Some(&[Field::new("row", "int"), Field::new("col", "int")]),
        ..SpecClass::base("Cell", module_path!(), crate::location!())
    };

    static EMPTY_SCHEMA: SpecClass = SpecClass {
        parent: Some(&DATA_SCHEMA),
        ..SpecClass::base("Empty", module_path!(), crate::location!())
    };

    static ACCOUNT_API: SpecClass = SpecClass {
        parent: Some(&API),
        methods: &[
            MethodDecl::new("balance", &["account"], balance).with_doc("Current balance."),
            MethodDecl::new("close", &["account", "reason"], balance),
        ],
        ..SpecClass::base("AccountApi", module_path!(), crate::location!())
    };

    fn dbpath(_: &Spec) -> Result<Value, SpecError> {
        Ok(Value::from("notes.db"))
    }

    static NOTE_STORE: SpecClass = SpecClass {
        parent: Some(&PEEWEE),
        accessors: &[Accessor::new("dbpath", dbpath)],
        fields: Some(&[Field::new("id", "int")]),
        ..SpecClass::base("Note", module_path!(), crate::location!())
    };

    static NO_PATH_STORE: SpecClass = SpecClass {
        parent: Some(&PEEWEE),
        ..SpecClass::base("NoPath", module_path!(), crate::location!())
    };

    static REQ: SpecClass = SpecClass {
        parent: Some(&REQUIREMENT),
        doc: Some(crate::fragment!("Players take turns.")),
        ..SpecClass::base("TakeTurns", module_path!(), crate::location!())
    };

    static STORY: SpecClass = SpecClass {
        parent: Some(&USER_STORY),
        ..SpecClass::base("Story", module_path!(), crate::location!())
    };

    #[test]
    fn test_data_schema_fields_in_declaration_order() {
        assert_eq!(
            Spec::new(&SCHEMA).render().unwrap(),
            "DATA-MODEL: Cell\nFIELDS:\n  - row: int\n  - col: int"
        );
    }

    #[test]
    fn test_data_schema_without_fields() {
        assert_eq!(
            Spec::new(&EMPTY_SCHEMA).render().unwrap(),
            "DATA-MODEL: Empty\nFIELDS:\n  - No fields defined."
        );
    }

    #[test]
    fn test_peewee_schema() {
        let text = Spec::new(&NOTE_STORE).render().unwrap();
        assert!(
            text.starts_with("DATA-MODEL: Note\nFIELDS:\n  - id: int\n\nPython PeeWee Database."),
            "{}",
            text
        );
        assert!(text.ends_with("The database file should be located at notes.db"));

        let err = Spec::new(&NO_PATH_STORE).render().unwrap_err();
        assert!(
            matches!(err, SpecError::Unimplemented { ref method, ref declared_in, .. }
                if method == "dbpath" && declared_in == "PeeWee"),
            "{:?}",
            err
        );
    }

    #[test]
    fn test_api_endpoints() {
        assert_eq!(
            Spec::new(&ACCOUNT_API).render().unwrap(),
            "API Specification: AccountApi\n\
             \n\
             Endpoints:\n  \
             - balance(account)\n\
             \n    \
             Description: Current balance.\n  \
             - close(account, reason)\n\
             \n    \
             Description: No description provided\n\
             \n\
             Constraints:"
        );
    }

    #[test]
    fn test_requirement() {
        let text = Spec::new(&REQ).render().unwrap();
        assert_eq!(
            text,
            "Players take turns.\n\nRequirement\nTITLE: TakeTurns\nREQUIREMENT-ID: docspec::spec::catalog::tests::TakeTurns"
        );
    }

    #[test]
    fn test_unimplemented_accessor_fails_render() {
        let err = Spec::new(&STORY).render().unwrap_err();
        match err {
            SpecError::Unimplemented {
                method,
                type_name,
                declared_in,
            } => {
                assert_eq!(method, "brief_title");
                assert_eq!(type_name, "Story");
                assert_eq!(declared_in, "UserStory");
            }
            other => panic!("Expected unimplemented accessor, got {:?}", other),
        }
    }

    #[test]
    fn test_stock_classes_descend_from_context() {
        for class in [
            &FEATURE,
            &DEF,
            &EDGE_CASE,
            &CONSTRAINT,
            &REQUIREMENT,
            &SYSTEM_REQUIREMENT,
            &IMPLEMENTATION,
            &DATA_SCHEMA,
            &SQLITE3,
            &PEEWEE,
            &API,
            &LIBRARY_API,
            &REST_API,
            &CMD_LINE,
            &USER_STORY,
        ] {
            assert!(class.descends_from(&CONTEXT), "{}", class.name);
        }
    }
}
