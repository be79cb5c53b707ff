//! C++ text for one harness descriptor.

use crate::descriptor::{HarnessDescriptor, StubKind};

/// Renders the wrapper class for a single descriptor.
///
/// The generated class looks like this for a `Widget` with one constructor
/// and two methods:
///
/// ```text
/// namespace ramfuzz {
/// class RF__Widget {
///  private:
///   // Owns internally created objects. Must precede obj declaration.
///   std::unique_ptr<Widget> pobj;
///  public:
///   Widget& obj; // Object under test.
///   RF__Widget(Widget& obj)
///     : obj(obj) {} // Object already created by caller.
///   Widget* Widget0();
///   void spin0();
///   void operatorp0();
///   // Creates obj internally, using indicated constructor.
///   RF__Widget(unsigned ctr);
///   using mptr = void (RF__Widget::*)();
///   static mptr roulette[2];
/// };
/// } // namespace ramfuzz
/// ```
pub struct HarnessCodeGen<'o> {
    namespace: &'o str,
    output: String,
    indent: usize,
}

impl<'o> HarnessCodeGen<'o> {
    pub fn new(namespace: &'o str) -> Self {
        Self {
            namespace,
            output: String::new(),
            indent: 0,
        }
    }

    /// Generate the namespaced wrapper declaration for `desc`.
    pub fn generate(mut self, desc: HarnessDescriptor<'_>) -> String {
        let cls = desc.class.qualified_name.as_str();
        let rfcls = desc.type_name.as_str();

        self.writeln(&format!("namespace {} {{", self.namespace));
        self.writeln(&format!("class {} {{", rfcls));

        self.label("private");
        self.indent += 1;
        self.writeln("// Owns internally created objects. Must precede obj declaration.");
        self.writeln(&format!("std::unique_ptr<{}> pobj;", cls));
        self.indent -= 1;

        self.label("public");
        self.indent += 1;
        self.writeln(&format!("{}& obj; // Object under test.", cls));
        self.writeln(&format!("{}({}& obj)", rfcls, cls));
        self.writeln("  : obj(obj) {} // Object already created by caller.");

        for stub in &desc.stubs {
            match stub.kind {
                StubKind::Constructor => self.writeln(&format!("{}* {}();", cls, stub.ident)),
                StubKind::Method => self.writeln(&format!("void {}();", stub.ident)),
            }
        }

        if desc.has_constructors() {
            self.writeln("// Creates obj internally, using indicated constructor.");
            self.writeln(&format!("{}(unsigned ctr);", rfcls));
        }

        self.writeln(&format!("using mptr = void ({}::*)();", rfcls));
        self.writeln(&format!("static mptr roulette[{}];", desc.method_count));
        self.indent -= 1;

        self.writeln("};");
        self.writeln(&format!("}} // namespace {}", self.namespace));

        self.output
    }

    /// Access label, set one space in from the class body.
    fn label(&mut self, access: &str) {
        self.output.push(' ');
        self.output.push_str(access);
        self.output.push_str(":\n");
    }

    fn writeln(&mut self, s: &str) {
        for _ in 0..self.indent {
            self.output.push_str("  ");
        }
        self.output.push_str(s);
        self.output.push('\n');
    }
}
