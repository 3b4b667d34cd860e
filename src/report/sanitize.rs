//! 序列化清洗：把任意内存值树改写为可严格 JSON 往返的形式
//!
//! 规则：
//! - 循环引用 -> `"[Circular Reference]"`（按引用身份判定，只看当前遍历路径，
//!   结构相同但不同的子树、以及非循环的共享子树都不会误判）
//! - undefined / 缺失 -> null
//! - NaN / ±Inf -> null
//! - 函数值 -> `"[Function]"`
//! - 嵌套超过 MAX_DEPTH 的容器 -> `"[Max Depth Exceeded]"`（保证严格解析器能读回）
//! - 其余原样保留
//!
//! 输出是 serde_json::Value，满足幂等：sanitize(sanitize(x)) == sanitize(x)。

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Number, Value};

pub const CIRCULAR_SENTINEL: &str = "[Circular Reference]";
pub const FUNCTION_SENTINEL: &str = "[Function]";
pub const DEPTH_SENTINEL: &str = "[Max Depth Exceeded]";

/// 容器最大嵌套深度（serde_json 解析器的递归上限为 128）
pub const MAX_DEPTH: usize = 100;

pub type Shared<T> = Rc<RefCell<T>>;

/// 任意内存值：容器通过共享引用持有子节点，因此可以成环
#[derive(Clone)]
pub enum DynValue {
    Undefined,
    Null,
    Bool(bool),
    Integer(i64),
    Unsigned(u64),
    Number(f64),
    String(String),
    /// 可调用值，只保留名字
    Function(String),
    Array(Shared<Vec<DynValue>>),
    Object(Shared<BTreeMap<String, DynValue>>),
}

impl fmt::Debug for DynValue {
    // 浅层输出，避免在环上无限递归
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => write!(f, "Undefined"),
            Self::Null => write!(f, "Null"),
            Self::Bool(b) => write!(f, "Bool({b})"),
            Self::Integer(i) => write!(f, "Integer({i})"),
            Self::Unsigned(u) => write!(f, "Unsigned({u})"),
            Self::Number(n) => write!(f, "Number({n})"),
            Self::String(s) => write!(f, "String({s:?})"),
            Self::Function(name) => write!(f, "Function({name})"),
            Self::Array(items) => match items.try_borrow() {
                Ok(items) => write!(f, "Array(len={})", items.len()),
                Err(_) => write!(f, "Array(<borrowed>)"),
            },
            Self::Object(map) => match map.try_borrow() {
                Ok(map) => write!(f, "Object(keys={:?})", map.keys().collect::<Vec<_>>()),
                Err(_) => write!(f, "Object(<borrowed>)"),
            },
        }
    }
}

impl DynValue {
    pub fn array(items: Vec<DynValue>) -> Self {
        Self::Array(Rc::new(RefCell::new(items)))
    }

    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, DynValue)>) -> Self {
        Self::Object(Rc::new(RefCell::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        )))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }

    /// 向对象插入键值；非对象返回 false
    pub fn insert(&self, key: impl Into<String>, value: DynValue) -> bool {
        match self {
            Self::Object(map) => {
                map.borrow_mut().insert(key.into(), value);
                true
            }
            _ => false,
        }
    }

    /// 向数组追加元素；非数组返回 false
    pub fn push(&self, value: DynValue) -> bool {
        match self {
            Self::Array(items) => {
                items.borrow_mut().push(value);
                true
            }
            _ => false,
        }
    }
}

impl From<&Value> for DynValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Integer(i)
                } else if let Some(u) = n.as_u64() {
                    Self::Unsigned(u)
                } else {
                    Self::Number(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => Self::String(s.clone()),
            Value::Array(items) => Self::array(items.iter().map(Self::from).collect()),
            Value::Object(map) => Self::object(map.iter().map(|(k, v)| (k.clone(), Self::from(v)))),
        }
    }
}

/// 清洗任意值树
pub fn sanitize(value: &DynValue) -> Value {
    let mut path = HashSet::new();
    sanitize_at(value, 0, &mut path)
}

/// 清洗一个 JSON 值（用于出站载荷与后端响应）
pub fn sanitize_json(value: &Value) -> Value {
    sanitize(&DynValue::from(value))
}

fn sanitize_at(value: &DynValue, depth: usize, path: &mut HashSet<usize>) -> Value {
    match value {
        DynValue::Undefined | DynValue::Null => Value::Null,
        DynValue::Bool(b) => Value::Bool(*b),
        DynValue::Integer(i) => Value::from(*i),
        DynValue::Unsigned(u) => Value::from(*u),
        DynValue::Number(n) => Number::from_f64(*n).map(Value::Number).unwrap_or(Value::Null),
        DynValue::String(s) => Value::String(s.clone()),
        DynValue::Function(_) => Value::String(FUNCTION_SENTINEL.to_string()),
        DynValue::Array(items) => {
            let id = Rc::as_ptr(items) as usize;
            if path.contains(&id) {
                return Value::String(CIRCULAR_SENTINEL.to_string());
            }
            if depth >= MAX_DEPTH {
                return Value::String(DEPTH_SENTINEL.to_string());
            }
            path.insert(id);
            let out = items
                .borrow()
                .iter()
                .map(|v| sanitize_at(v, depth + 1, path))
                .collect();
            path.remove(&id);
            Value::Array(out)
        }
        DynValue::Object(map) => {
            let id = Rc::as_ptr(map) as usize;
            if path.contains(&id) {
                return Value::String(CIRCULAR_SENTINEL.to_string());
            }
            if depth >= MAX_DEPTH {
                return Value::String(DEPTH_SENTINEL.to_string());
            }
            path.insert(id);
            let out: Map<String, Value> = map
                .borrow()
                .iter()
                .map(|(k, v)| (k.clone(), sanitize_at(v, depth + 1, path)))
                .collect();
            path.remove(&id);
            Value::Object(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_self_reference_becomes_sentinel() {
        let obj = DynValue::object([("name", DynValue::string("root"))]);
        obj.insert("self", obj.clone());
        let out = sanitize(&obj);
        assert_eq!(out, json!({"name": "root", "self": CIRCULAR_SENTINEL}));
    }

    #[test]
    fn test_indirect_cycle_through_array() {
        let list = DynValue::array(vec![DynValue::Integer(1)]);
        let holder = DynValue::object([("list", list.clone())]);
        list.push(holder.clone());
        let out = sanitize(&holder);
        assert_eq!(out, json!({"list": [1, CIRCULAR_SENTINEL]}));
    }

    #[test]
    fn test_shared_subtree_is_not_a_cycle() {
        let shared = DynValue::object([("v", DynValue::Integer(7))]);
        let root = DynValue::object([("a", shared.clone()), ("b", shared)]);
        assert_eq!(sanitize(&root), json!({"a": {"v": 7}, "b": {"v": 7}}));
    }

    #[test]
    fn test_equal_but_distinct_subtrees() {
        let a = DynValue::object([("v", DynValue::Integer(1))]);
        let b = DynValue::object([("v", DynValue::Integer(1))]);
        let root = DynValue::array(vec![a, b]);
        assert_eq!(sanitize(&root), json!([{"v": 1}, {"v": 1}]));
    }

    #[test]
    fn test_special_scalars() {
        let root = DynValue::object([
            ("undef", DynValue::Undefined),
            ("nan", DynValue::Number(f64::NAN)),
            ("inf", DynValue::Number(f64::INFINITY)),
            ("ninf", DynValue::Number(f64::NEG_INFINITY)),
            ("f", DynValue::Function("callback".to_string())),
            ("ok", DynValue::Number(1.5)),
        ]);
        assert_eq!(
            sanitize(&root),
            json!({"undef": null, "nan": null, "inf": null, "ninf": null,
                   "f": FUNCTION_SENTINEL, "ok": 1.5})
        );
    }

    #[test]
    fn test_deep_nesting_is_capped() {
        let mut v = DynValue::Integer(0);
        for _ in 0..(MAX_DEPTH + 20) {
            v = DynValue::array(vec![v]);
        }
        let out = sanitize(&v);
        let text = serde_json::to_string(&out).unwrap();
        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, out);
        assert!(text.contains(DEPTH_SENTINEL));
    }

    #[test]
    fn test_idempotent_on_json() {
        let v = json!({"a": [1, 2.5, "x", null, {"b": true}], "c": {}});
        let once = sanitize_json(&v);
        assert_eq!(once, v);
        assert_eq!(sanitize_json(&once), once);
    }

    #[test]
    fn test_debug_is_shallow_on_cycles() {
        let obj = DynValue::object::<String>([]);
        obj.insert("me", obj.clone());
        assert!(format!("{obj:?}").contains("me"));
    }
}
