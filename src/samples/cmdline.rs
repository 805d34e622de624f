//! A greeting command-line tool

use crate::aggregate::Namespace;
use crate::spec::catalog::{CMD_LINE, FEATURE, SYSTEM_REQUIREMENT};
use crate::spec::{Accessor, MethodDecl, SpecClass};

pub static PROGRAMMING_LANGUAGE: SpecClass = SpecClass {
    parent: Some(&SYSTEM_REQUIREMENT),
    doc: Some(crate::fragment!("Use the Python programming language.")),
    accessors: &[
        Accessor::new("req_id", fixed!("REQ-007")),
        Accessor::new("title", fixed!("specifies programming languages")),
    ],
    ..SpecClass::base("ProgrammingLanguage", module_path!(), crate::location!())
};

pub static DISPLAY_ARG: SpecClass = SpecClass {
    parent: Some(&FEATURE),
    doc: Some(crate::fragment!(
        "Display a command line arg on the terminal followed by a new line."
    )),
    ..SpecClass::base("DisplayArg", module_path!(), crate::location!())
};

pub static HELLO_CMD_LINE: SpecClass = SpecClass {
    parent: Some(&CMD_LINE),
    methods: &[
        MethodDecl::new("help", &[], fixed!("-h --help")).with_doc("show this help dialog"),
        MethodDecl::new("name", &[], fixed!("-n --name")).with_doc("provide a name to greet"),
        MethodDecl::new("repeat", &[], fixed!("-r --repeat (N:int)")).with_doc("repeat word N times."),
    ],
    ..SpecClass::base("HelloCmdLine", module_path!(), crate::location!())
};

pub static NAMESPACE: Namespace = Namespace {
    name: module_path!(),
    classes: &[&PROGRAMMING_LANGUAGE, &DISPLAY_ARG, &HELLO_CMD_LINE],
};
