use std::collections::BTreeMap;

use crate::OPERATOR_NAME;

pub fn get_dependency_labels() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("app.kubernetes.io/name".to_owned(), "gitops".to_owned()),
        ("app.kubernetes.io/component".to_owned(), "dependency".to_owned()),
        ("app.kubernetes.io/managed-by".to_owned(), OPERATOR_NAME.to_owned()),
    ])
}

pub fn get_console_link_labels() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("app.kubernetes.io/name".to_owned(), "gitops".to_owned()),
        ("app.kubernetes.io/component".to_owned(), "console-link".to_owned()),
        ("app.kubernetes.io/managed-by".to_owned(), OPERATOR_NAME.to_owned()),
    ])
}
