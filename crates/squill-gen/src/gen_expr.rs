//! Default renderings for scalar expression forms: CASE, functions, types,
//! and windows.

use squill_ast::Expr;

use crate::Generator;

impl Generator {
    pub(crate) fn case_sql(
        &self,
        operand: Option<&Expr>,
        whens: &[Expr],
        otherwise: Option<&Expr>,
    ) -> String {
        let mut out = self.keyword("CASE");
        if let Some(op) = operand {
            out.push(' ');
            out.push_str(&self.sql(op));
        }
        for when in whens {
            out.push(' ');
            out.push_str(&self.sql(when));
        }
        if let Some(e) = otherwise {
            out.push(' ');
            out.push_str(&self.keyword("ELSE"));
            out.push(' ');
            out.push_str(&self.sql(e));
        }
        out.push(' ');
        out.push_str(&self.keyword("END"));
        out
    }

    pub(crate) fn function_sql(&self, name: &str, args: &[Expr], distinct: bool) -> String {
        let name = if self.config().normalize {
            name.to_uppercase()
        } else {
            name.to_string()
        };
        let args = if distinct {
            format!("{} {}", self.keyword("DISTINCT"), self.csv(args))
        } else {
            self.csv(args)
        };
        format!("{name}({args})")
    }

    pub(crate) fn data_type_sql(&self, name: &str, params: &[Expr]) -> String {
        if params.is_empty() {
            self.keyword(name)
        } else {
            format!("{}({})", self.keyword(name), self.csv(params))
        }
    }

    pub(crate) fn window_sql(
        &self,
        this: &Expr,
        partition_by: &[Expr],
        order_by: &[Expr],
    ) -> String {
        let mut spec = Vec::new();
        if !partition_by.is_empty() {
            spec.push(format!(
                "{} {}",
                self.keyword("PARTITION BY"),
                self.csv(partition_by)
            ));
        }
        if !order_by.is_empty() {
            spec.push(format!("{} {}", self.keyword("ORDER BY"), self.csv(order_by)));
        }
        format!(
            "{} {} ({})",
            self.sql(this),
            self.keyword("OVER"),
            spec.join(" ")
        )
    }

    /// MAP renders its keys and values interleaved pairwise.
    pub(crate) fn map_sql(&self, keys: &[Expr], values: &[Expr]) -> String {
        let pairs = keys
            .iter()
            .zip(values.iter())
            .flat_map(|(k, v)| [self.sql(k), self.sql(v)])
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({pairs})", self.keyword("MAP"))
    }
}
