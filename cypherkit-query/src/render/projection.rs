//! RETURN, WITH, ORDER BY, UNWIND, SKIP and LIMIT.

use super::{keyword_raw, non_blank, non_empty};
use crate::bind_param::BindParam;
use crate::clause::{
    OrderByClause, OrderByItem, Pagination, Projection, ProjectionClause, ReturnItem,
    SortDirection, UnwindClause,
};
use crate::error::{Error, Result};
use crate::escape::{escape_if_needed, escape_joined};
use cypherkit_api::PropertyValue;

pub(super) fn render_projection(
    keyword: &str,
    key: &str,
    clause: &ProjectionClause,
) -> Result<String> {
    let keyword = if clause.distinct {
        format!("{keyword} DISTINCT")
    } else {
        keyword.to_string()
    };
    match &clause.projection {
        Projection::Raw(raw) => keyword_raw(&keyword, key, raw),
        Projection::Names(names) => {
            non_empty(key, names)?;
            Ok(format!("{keyword} {}", escape_joined(names, ", ")))
        }
        Projection::Items(items) => {
            non_empty(key, items)?;
            let items = items
                .iter()
                .map(return_item)
                .collect::<Result<Vec<_>>>()?;
            Ok(format!("{keyword} {}", items.join(", ")))
        }
    }
}

fn return_item(item: &ReturnItem) -> Result<String> {
    let mut text = property_access(&item.identifier, item.property.as_deref())?;
    if let Some(alias) = &item.alias {
        text.push_str(" AS ");
        text.push_str(&escape_if_needed(non_blank("alias", alias)?));
    }
    Ok(text)
}

pub(super) fn render_order_by(order_by: &OrderByClause) -> Result<String> {
    match order_by {
        OrderByClause::Raw(raw) => keyword_raw("ORDER BY", "orderBy", raw),
        OrderByClause::Items(items) => {
            non_empty("orderBy", items)?;
            let items = items
                .iter()
                .map(order_by_item)
                .collect::<Result<Vec<_>>>()?;
            Ok(format!("ORDER BY {}", items.join(", ")))
        }
    }
}

fn order_by_item(item: &OrderByItem) -> Result<String> {
    let mut text = property_access(&item.identifier, item.property.as_deref())?;
    match item.direction {
        Some(SortDirection::Ascending) => text.push_str(" ASC"),
        Some(SortDirection::Descending) => text.push_str(" DESC"),
        None => {}
    }
    Ok(text)
}

fn property_access(identifier: &str, property: Option<&str>) -> Result<String> {
    let identifier = escape_if_needed(non_blank("identifier", identifier)?);
    Ok(match property {
        Some(property) => format!("{identifier}.{}", escape_if_needed(property)),
        None => identifier,
    })
}

pub(super) fn render_unwind(unwind: &UnwindClause, bind_param: &mut BindParam) -> Result<String> {
    match unwind {
        UnwindClause::Raw(raw) => keyword_raw("UNWIND", "unwind", raw),
        UnwindClause::Expression { value, alias } => Ok(format!(
            "UNWIND {} AS {}",
            non_blank("value", value)?,
            escape_if_needed(non_blank("as", alias)?)
        )),
        UnwindClause::Values { values, alias } => {
            let alias = escape_if_needed(non_blank("as", alias)?);
            let param = bind_param.unique_name_and_add("unwind", PropertyValue::List(values.clone()));
            Ok(format!("UNWIND ${} AS {alias}", escape_if_needed(&param)))
        }
    }
}

/// A count is bound under `skip`/`limit` (suffixed if taken) so that the
/// statement text does not change with the page.
pub(super) fn render_pagination(
    keyword: &str,
    key: &str,
    pagination: &Pagination,
    bind_param: &mut BindParam,
) -> Result<String> {
    match pagination {
        Pagination::Raw(raw) => keyword_raw(keyword, key, raw),
        Pagination::Count(count) => {
            let count = i64::try_from(*count).map_err(|_| {
                Error::shape(key, "an integer no greater than 2^63 - 1", count.to_string())
            })?;
            let param = bind_param.unique_name_and_add(key, count);
            Ok(format!("{keyword} ${}", escape_if_needed(&param)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{render_order_by, render_pagination, render_projection, render_unwind};
    use crate::bind_param::BindParam;
    use crate::clause::{
        OrderByClause, OrderByItem, Pagination, ProjectionClause, ReturnItem, UnwindClause,
    };
    use cypherkit_api::PropertyValue;

    #[test]
    fn return_names_and_items() {
        assert_eq!(
            render_projection("RETURN", "return", &ProjectionClause::new(["a", "b c"]))
                .expect("render"),
            "RETURN a, `b c`"
        );
        let items = ProjectionClause::new(vec![
            ReturnItem::new("n").property("name").alias("name"),
            ReturnItem::new("m"),
        ]);
        assert_eq!(
            render_projection("RETURN", "return", &items).expect("render"),
            "RETURN n.name AS name, m"
        );
    }

    #[test]
    fn with_distinct() {
        let clause = ProjectionClause::distinct(["n"]);
        assert_eq!(
            render_projection("WITH", "with", &clause).expect("render"),
            "WITH DISTINCT n"
        );
    }

    #[test]
    fn empty_projection_names_the_clause() {
        let clause = ProjectionClause::new(Vec::<&str>::new());
        let err = render_projection("RETURN", "return", &clause).expect_err("empty");
        assert_eq!(err.key(), Some("return"));
    }

    #[test]
    fn order_by_items() {
        let clause = OrderByClause::Items(vec![
            OrderByItem::new("n").property("age").descending(),
            OrderByItem::new("n").property("name").ascending(),
            OrderByItem::new("m"),
        ]);
        assert_eq!(
            render_order_by(&clause).expect("render"),
            "ORDER BY n.age DESC, n.name ASC, m"
        );
        assert_eq!(
            render_order_by(&OrderByClause::from("rand()")).expect("render"),
            "ORDER BY rand()"
        );
    }

    #[test]
    fn unwind_expression_and_bound_values() {
        let mut bp = BindParam::new();
        let expression = UnwindClause::Expression {
            value: "n.tags".into(),
            alias: "tag".into(),
        };
        assert_eq!(
            render_unwind(&expression, &mut bp).expect("render"),
            "UNWIND n.tags AS tag"
        );

        let values = UnwindClause::Values {
            values: vec![PropertyValue::Int(1), PropertyValue::Int(2)],
            alias: "x".into(),
        };
        assert_eq!(
            render_unwind(&values, &mut bp).expect("render"),
            "UNWIND $unwind AS x"
        );
        assert_eq!(
            bp.get().get("unwind"),
            Some(&PropertyValue::List(vec![
                PropertyValue::Int(1),
                PropertyValue::Int(2)
            ]))
        );
    }

    #[test]
    fn counts_are_bound_and_raw_is_spliced() {
        let mut bp = BindParam::new();
        assert_eq!(
            render_pagination("LIMIT", "limit", &Pagination::Count(10), &mut bp).expect("render"),
            "LIMIT $limit"
        );
        assert_eq!(
            render_pagination("LIMIT", "limit", &Pagination::Count(5), &mut bp).expect("render"),
            "LIMIT $limit__aaaa"
        );
        assert_eq!(
            render_pagination("SKIP", "skip", &Pagination::from("$page * 10"), &mut bp)
                .expect("render"),
            "SKIP $page * 10"
        );
        assert_eq!(bp.get().get("limit"), Some(&PropertyValue::Int(10)));
        assert_eq!(bp.len(), 2);
    }

    #[test]
    fn oversized_counts_are_rejected() {
        let mut bp = BindParam::new();
        let err = render_pagination("SKIP", "skip", &Pagination::Count(u64::MAX), &mut bp)
            .expect_err("too large");
        assert_eq!(err.key(), Some("skip"));
        assert!(bp.is_empty());
    }
}
