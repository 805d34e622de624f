//! Bank account library

use crate::aggregate::Namespace;
use crate::spec::catalog::{CONSTRAINT, DATA_SCHEMA, FEATURE, LIBRARY_API, REQUIREMENT, SYSTEM_REQUIREMENT};
use crate::spec::{Accessor, Field, MethodDecl, Spec, SpecClass, SpecError};
use crate::value::Value;

pub static ACCOUNT: SpecClass = SpecClass {
    parent: Some(&DATA_SCHEMA),
    doc: Some(crate::fragment!(
        "Represents a bank account with balance and transaction history"
    )),
    fields: Some(&[
        Field::new("account_id", "str"),
        Field::new("owner", "str"),
        Field::new("balance", "float"),
        Field::new("transactions", "list[dict]"),
    ]),
    ..SpecClass::base("Account", module_path!(), crate::location!())
};

pub static TRANSACTION_REQUEST: SpecClass = SpecClass {
    parent: Some(&DATA_SCHEMA),
    doc: Some(crate::fragment!(
        "Represents a request to deposit or withdraw money"
    )),
    fields: Some(&[Field::new("account_id", "str"), Field::new("amount", "float")]),
    ..SpecClass::base("TransactionRequest", module_path!(), crate::location!())
};

pub static CREATE_ACCOUNT: SpecClass = SpecClass {
    parent: Some(&REQUIREMENT),
    doc: Some(crate::fragment!(
        "As a user, I want to request a new bank account so that I have an account to manage funds."
    )),
    accessors: &[
        Accessor::new("req_id", fixed!("REQ-001")),
        Accessor::new("title", fixed!("Create Bank Account")),
    ],
    ..SpecClass::base("CreateAccount", module_path!(), crate::location!())
};

pub static DEPOSIT_MONEY: SpecClass = SpecClass {
    parent: Some(&REQUIREMENT),
    doc: Some(crate::fragment!(
        "As a user, I want to deposit money into an account so that its balance increases."
    )),
    accessors: &[
        Accessor::new("req_id", fixed!("REQ-002")),
        Accessor::new("title", fixed!("Deposit Money")),
    ],
    ..SpecClass::base("DepositMoney", module_path!(), crate::location!())
};

pub static WITHDRAW_MONEY: SpecClass = SpecClass {
    parent: Some(&REQUIREMENT),
    doc: Some(crate::fragment!(
        r"
        As a user, I want to withdraw money from an account without
        overdrawing so that I can access cash while respecting the balance.
        "
    )),
    accessors: &[
        Accessor::new("req_id", fixed!("REQ-003")),
        Accessor::new("title", fixed!("Withdraw Money")),
    ],
    ..SpecClass::base("WithdrawMoney", module_path!(), crate::location!())
};

pub static TEST_SUITE: SpecClass = SpecClass {
    parent: Some(&SYSTEM_REQUIREMENT),
    doc: Some(crate::fragment!("Build tests for every endpoint.")),
    accessors: &[
        Accessor::new("req_id", fixed!("REQ-005")),
        Accessor::new("title", fixed!("Test Suite")),
    ],
    ..SpecClass::base("TestSuite", module_path!(), crate::location!())
};

pub static BANK_FEATURES: SpecClass = SpecClass {
    parent: Some(&FEATURE),
    doc: Some(crate::fragment!(
        r"
        Provides endpoints to create accounts, deposit, withdraw, check
        balance, and list transactions.
        "
    )),
    accessors: &[Accessor::new("feature_name", fixed!("bank-api-features"))],
    ..SpecClass::base("BankFeatures", module_path!(), crate::location!())
};

pub static POSITIVE_TRANSACTION: SpecClass = SpecClass {
    parent: Some(&CONSTRAINT),
    doc: Some(crate::fragment!("Transactions must be positive numbers.")),
    accessors: &[
        Accessor::new("constraint_id", fixed!("CONST-001")),
        Accessor::new(
            "enforcement_logic",
            fixed!("Raise an error if transaction amount <= 0"),
        ),
    ],
    ..SpecClass::base("PositiveTransaction", module_path!(), crate::location!())
};

pub static CANNOT_OVERDRAW: SpecClass = SpecClass {
    parent: Some(&CONSTRAINT),
    doc: Some(crate::fragment!("Cannot withdraw more than current balance.")),
    accessors: &[
        Accessor::new("constraint_id", fixed!("CONST-002")),
        Accessor::new(
            "enforcement_logic",
            fixed!("Raise an error if withdraw amount > account.balance"),
        ),
    ],
    ..SpecClass::base("CannotOverdraw", module_path!(), crate::location!())
};

fn version(_: &Spec) -> Result<Value, SpecError> {
    Ok(Value::Int(1))
}

fn no_result(_: &Spec) -> Result<Value, SpecError> {
    Ok(Value::Null)
}

pub static BANK_API: SpecClass = SpecClass {
    parent: Some(&LIBRARY_API),
    doc: Some(crate::fragment!("Bank Account API spec: all endpoints are abstract.")),
    accessors: &[Accessor::new("version", version)],
    methods: &[
        MethodDecl::new("version", &[], version)
            .with_doc("Return the version of this API.")
            .with_location(crate::location!()),
        MethodDecl::new("create_account", &["owner"], no_result)
            .with_doc("Create a new account for the given owner.")
            .with_location(crate::location!()),
        MethodDecl::new("deposit", &["account_id", "amount"], no_result)
            .with_doc("Deposit money into the specified account.")
            .with_location(crate::location!()),
        MethodDecl::new("withdraw", &["account_id", "amount"], no_result)
            .with_doc("Withdraw money if balance allows.")
            .with_location(crate::location!()),
        MethodDecl::new("balance", &["account_id"], no_result)
            .with_doc("Return current account balance.")
            .with_location(crate::location!()),
        MethodDecl::new("transactions", &["account_id"], no_result),
    ],
    ..SpecClass::base("BankAPI", module_path!(), crate::location!())
};

pub static NAMESPACE: Namespace = Namespace {
    name: module_path!(),
    classes: &[
        &ACCOUNT,
        &TRANSACTION_REQUEST,
        &CREATE_ACCOUNT,
        &DEPOSIT_MONEY,
        &WITHDRAW_MONEY,
        &TEST_SUITE,
        &BANK_FEATURES,
        &POSITIVE_TRANSACTION,
        &CANNOT_OVERDRAW,
        &BANK_API,
    ],
};
