//! 工具声明生成：由参数结构体经 schemars 自动生成，保证声明与解析用的是同一份类型
//!
//! 生成的 JSON Schema 只保留服务端接受的 OpenAPI 子集字段（type / description / properties /
//! required / enum / items / nullable），其余（$schema、title、format、default 等）一律剥除。

use schemars::gen::SchemaSettings;
use schemars::JsonSchema;
use serde_json::{Map, Value};

use crate::llm::FunctionDeclaration;
use crate::tools::registry::{
    CloneRepositoryArgs, ListDirectoryArgs, LogChangeArgs, ReadFileArgs, RunShellArgs,
    SearchInFilesArgs, WriteFileArgs, CLONE_REPOSITORY, LIST_DIRECTORY, LOG_CHANGE, READ_FILE,
    RUN_SHELL, SEARCH_IN_FILES, WRITE_FILE,
};

const KEPT_KEYS: &[&str] = &[
    "type",
    "description",
    "properties",
    "required",
    "enum",
    "items",
    "nullable",
];

/// 全部工具声明（顺序固定）
pub fn function_declarations() -> Vec<FunctionDeclaration> {
    vec![
        declare::<CloneRepositoryArgs>(
            CLONE_REPOSITORY,
            "Clone a git repository. Returns the directory it was cloned into.",
        ),
        declare::<RunShellArgs>(
            RUN_SHELL,
            "Run a shell command. Use for git, mvn, gradle, sed, grep, find, javac.",
        ),
        declare::<ReadFileArgs>(READ_FILE, "Read a file's contents."),
        declare::<WriteFileArgs>(
            WRITE_FILE,
            "Write or overwrite a file. Use for Java source files ONLY, not pom.xml. A .bak backup of the previous content is kept.",
        ),
        declare::<ListDirectoryArgs>(LIST_DIRECTORY, "List files recursively."),
        declare::<SearchInFilesArgs>(SEARCH_IN_FILES, "Search for a regex pattern across files."),
        declare::<LogChangeArgs>(
            LOG_CHANGE,
            "Log every migration change. Call after EVERY file you modify.",
        ),
    ]
}

fn declare<T: JsonSchema>(name: &str, description: &str) -> FunctionDeclaration {
    let mut settings = SchemaSettings::openapi3();
    settings.inline_subschemas = true;
    let root = settings.into_generator().into_root_schema_for::<T>();
    let raw = serde_json::to_value(&root.schema).unwrap_or(Value::Null);
    FunctionDeclaration {
        name: name.to_string(),
        description: description.to_string(),
        parameters: sanitize(raw),
    }
}

fn sanitize(value: Value) -> Value {
    let Value::Object(map) = value else {
        return value;
    };
    let mut out = Map::new();
    for (key, val) in map {
        if !KEPT_KEYS.contains(&key.as_str()) {
            continue;
        }
        let val = match (key.as_str(), val) {
            ("properties", Value::Object(props)) => Value::Object(
                props
                    .into_iter()
                    .map(|(k, v)| (k, sanitize(v)))
                    .collect(),
            ),
            ("items", v) => sanitize(v),
            (_, v) => v,
        };
        out.insert(key, val);
    }
    Value::Object(out)
}
