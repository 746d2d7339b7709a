use serde_json::{Map, Number as JsonNumber, Value};
use swc_common::{sync::Lrc, FileName, SourceMap};
use swc_ecma_ast::*;
use swc_ecma_parser::{lexer::Lexer, Parser as SwcParser, StringInput, Syntax, TsConfig};
use swc_ecma_visit::{Visit, VisitWith};
use std::collections::HashMap;

use std::fs;
use std::path::Path;

use tracing::{debug, trace};

use crate::error::{Error, Result};

/// AST をトラバースして、指定した名前の変数に束縛されたリテラルを JSON 値として取り出す Visitor
struct LiteralVisitor<'a> {
    /// 取り出したい変数名 (例: "adminMenuItems")
    targets: &'a [&'a str],
    /// 変数名とその初期化式 (JSON 化済み) のマッピング
    pub bindings: HashMap<String, Value>,
    /// 変換できなかった式の数
    skipped_exprs: usize,
}

impl<'a> LiteralVisitor<'a> {
    fn new(targets: &'a [&'a str]) -> Self {
        LiteralVisitor {
            targets,
            bindings: HashMap::new(),
            skipped_exprs: 0,
        }
    }

    fn prop_key(key: &PropName) -> Option<String> {
        match key {
            PropName::Ident(ident) => Some(ident.sym.to_string()),
            PropName::Str(Str { value, .. }) => Some(value.to_string()),
            PropName::Num(Number { value, .. }) => Some(value.to_string()),
            _ => None,
        }
    }

    /// ObjectLit (例: `{ id: "1", title: "仪表板", hide: true }`) を JSON オブジェクトに変換する
    fn object_to_json(&mut self, obj_lit: &ObjectLit) -> Value {
        let mut map = Map::new();
        for prop in &obj_lit.props {
            if let PropOrSpread::Prop(boxed_prop) = prop {
                if let Prop::KeyValue(KeyValueProp { key, value }) = &**boxed_prop {
                    if let Some(key_name) = Self::prop_key(key) {
                        let v = self.expr_to_json(value);
                        trace!("    → プロパティ: {} = {}", key_name, v);
                        map.insert(key_name, v);
                    }
                }
            }
        }
        Value::Object(map)
    }

    /// 配列・オブジェクト・文字列・真偽値・数値・null だけを扱い、それ以外は null とみなす
    fn expr_to_json(&mut self, expr: &Expr) -> Value {
        match expr {
            Expr::Lit(Lit::Str(Str { value, .. })) => Value::String(value.to_string()),
            Expr::Lit(Lit::Bool(Bool { value, .. })) => Value::Bool(*value),
            Expr::Lit(Lit::Null(_)) => Value::Null,
            Expr::Lit(Lit::Num(Number { value, .. })) => {
                JsonNumber::from_f64(*value).map_or(Value::Null, Value::Number)
            }
            Expr::Tpl(Tpl { exprs, quasis, .. }) if exprs.is_empty() && quasis.len() == 1 => {
                Value::String(quasis[0].raw.to_string())
            }
            Expr::Array(arr_lit) => Value::Array(
                arr_lit
                    .elems
                    .iter()
                    .flatten()
                    .map(|elem| self.expr_to_json(&elem.expr))
                    .collect(),
            ),
            Expr::Object(obj_lit) => self.object_to_json(obj_lit),
            Expr::Paren(ParenExpr { expr, .. })
            | Expr::TsAs(TsAsExpr { expr, .. })
            | Expr::TsConstAssertion(TsConstAssertion { expr, .. })
            | Expr::TsSatisfies(TsSatisfiesExpr { expr, .. }) => self.expr_to_json(expr),
            _ => {
                self.skipped_exprs += 1;
                Value::Null
            }
        }
    }
}

impl Visit for LiteralVisitor<'_> {
    /// 変数宣言をキャッチして、対象の名前ならリテラルを記録する
    fn visit_var_decl(&mut self, var_decl: &VarDecl) {
        for declarator in &var_decl.decls {
            if let Pat::Ident(BindingIdent { id, .. }) = &declarator.name {
                let var_name = id.sym.to_string();

                if self.targets.contains(&var_name.as_str()) {
                    if let Some(init_expr) = &declarator.init {
                        let value = self.expr_to_json(init_expr);
                        debug!("  → 変数宣言発見: {}", var_name);
                        self.bindings.insert(var_name, value);
                    }
                }
            }
        }

        // 子ノードも訪問
        var_decl.visit_children_with(self);
    }
}

/// TypeScript モジュールを解析し、`targets` に挙げた変数のリテラル値を返す
pub fn extract_literals(file_path: &Path, targets: &[&str]) -> Result<HashMap<String, Value>> {
    debug!("ファイル解析開始: {:?}", file_path);

    let src = fs::read_to_string(file_path)?;
    parse_literals(file_path, src, targets)
}

fn parse_literals(file_path: &Path, src: String, targets: &[&str]) -> Result<HashMap<String, Value>> {
    let cm: Lrc<SourceMap> = Default::default();

    let fm = cm.new_source_file(FileName::Real(file_path.to_path_buf()), src);

    // TypeScript構文でパースする設定
    let syntax = Syntax::Typescript(TsConfig {
        tsx: false,
        decorators: true,
        dts: false,
        no_early_errors: true,
        disallow_ambiguous_jsx_like: true,
    });

    let lexer = Lexer::new(
        syntax,
        Default::default(), // es version
        StringInput::from(&*fm),
        None,
    );

    let mut parser = SwcParser::new_from(lexer);

    let module = parser.parse_module().map_err(|e| Error::Parse {
        file: file_path.to_path_buf(),
        message: format!("{:?}", e.kind()),
    })?;

    let mut visitor = LiteralVisitor::new(targets);
    visitor.visit_module(&module);

    debug!(
        "解析完了: 変数 {} 個 / 変換できなかった式 {} 個",
        visitor.bindings.len(),
        visitor.skipped_exprs
    );

    Ok(visitor.bindings)
}
