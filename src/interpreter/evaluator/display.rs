use crate::interpreter::{
    evaluator::core::Interpreter,
    value::core::{Value, fmt_double},
};

impl Interpreter {
    /// Writes `text` through the installed output sink.
    pub(crate) fn output(&mut self, text: &str) {
        let mut sink = self.output.borrow_mut();
        (*sink)(text);
    }

    /// Emits the display for a named value.
    ///
    /// A `name =` header precedes everything except `ans` (the result of
    /// an unassigned expression). Scalars print on one line, matrices in
    /// rows, logicals as `1`/`0` or `true`/`false`, complex values as
    /// `a+bi`, structs as field summaries, cells as element summaries
    /// truncated past 20, function handles as `@name`, and empty as `[]`.
    pub(crate) fn display_value(&mut self, name: &str, value: &Value) {
        let mut out = String::new();
        if !name.is_empty() && name != "ans" {
            out.push_str(name);
            out.push_str(" =\n");
        }

        match value {
            Value::Double(a) => {
                if a.numel() == 1 {
                    out.push_str(&format!("    {}\n", fmt_double(a.data()[0])));
                } else {
                    let d = a.dims();
                    for p in 0..d.pages {
                        if d.is_3d() {
                            out.push_str(&format!("(:,:,{}) =\n", p + 1));
                        }
                        for r in 0..d.rows {
                            out.push_str("   ");
                            for c in 0..d.cols {
                                out.push_str(&format!(
                                    " {}",
                                    fmt_double(a.data()[d.sub2ind3(r, c, p)])
                                ));
                            }
                            out.push('\n');
                        }
                    }
                }
            }
            Value::Char(a) => {
                out.push_str(&format!("    '{}'\n", String::from_utf8_lossy(a.data())));
            }
            Value::Logical(a) => {
                if a.numel() == 1 {
                    out.push_str(&format!(
                        "    {}\n",
                        if a.data()[0] != 0 { "true" } else { "false" }
                    ));
                } else {
                    let d = a.dims();
                    for r in 0..d.rows {
                        out.push_str("   ");
                        for c in 0..d.cols {
                            out.push_str(&format!(
                                " {}",
                                if a.data()[d.sub2ind(r, c)] != 0 { "1" } else { "0" }
                            ));
                        }
                        out.push('\n');
                    }
                }
            }
            Value::Complex(a) => {
                if a.numel() == 1 {
                    out.push_str(&format!("    {}\n", a.data()[0]));
                } else {
                    let d = a.dims();
                    for r in 0..d.rows {
                        out.push_str("   ");
                        for c in 0..d.cols {
                            out.push_str(&format!(" {}", a.data()[d.sub2ind(r, c)]));
                        }
                        out.push('\n');
                    }
                }
            }
            Value::Struct(s) => {
                out.push_str("  struct with fields:\n");
                for (field, v) in s.fields() {
                    out.push_str(&format!("    {field}: {}\n", v.debug_string()));
                }
            }
            Value::FuncHandle(handle) => {
                out.push_str(&format!("    @{handle}\n"));
            }
            Value::Cell(cell) => {
                let d = cell.dims();
                out.push_str(&format!("  {{{}x{} cell}}\n", d.rows, d.cols));
                for (i, v) in cell.data().iter().take(20).enumerate() {
                    out.push_str(&format!("    {{{}}}: {}\n", i + 1, v.debug_string()));
                }
                if cell.numel() > 20 {
                    out.push_str(&format!("    ... ({} more)\n", cell.numel() - 20));
                }
            }
            Value::Empty => out.push_str("    []\n"),
        }

        self.output(&out);
    }
}
