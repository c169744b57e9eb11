use log::trace;
use oxc_ast::ast::*;
use std::collections::{HashSet, VecDeque};

/// One qualifying identifier occurrence, with a snapshot of every name bound
/// in the enclosing lexical scope at the moment of observation.
#[derive(Debug, Clone)]
pub struct IdentifierObservation {
    pub name: String,
    /// The identifier introduces a binding into the active scope.
    pub is_binding: bool,
    /// The identifier occupies a reference position: a property access, an
    /// object-literal key, a JSX tag, or a type annotation.
    pub is_reference: bool,
    /// The identifier is a JSX tag name (whole tag, or the object part of a
    /// dotted tag).
    pub is_markup: bool,
    pub defined_in_scope: HashSet<String>,
}

/// Structural slot an identifier occupies. Decides whether the occurrence
/// binds a name, references one, or is a plain use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    /// Declaration ids, import-specifier names, parameters, destructuring
    /// targets, the left side of default-value patterns.
    Binding,
    /// Property accesses and non-destructuring object-literal keys.
    Reference,
    /// JSX tag names.
    Markup,
    /// Identifiers inside type annotations.
    TypePosition,
    /// Any other expression position.
    Plain,
}

/// Walks a syntax tree and invokes `visitor` once per qualifying identifier.
///
/// The traversal runs two explicit queues. Children of the current scope go
/// through an immediate queue in structural order; whenever a node starts a
/// nested scope (a function, arrow, or class body, together with its
/// parameter list), its contents are parked on a deferred queue instead.
/// The deferred queue drains only after the current scope's immediate queue
/// is empty, and every deferred body starts from a clone of the fully
/// accumulated enclosing set. That makes `defined_in_scope` hoisting-correct
/// inside nested bodies, and keeps nested bindings from leaking outward.
///
/// Observation order is structural within one scope but not across scope
/// boundaries. Node shapes outside the recognized rules produce no
/// observation; in-progress or unusual sources must never be fatal here.
pub fn visit_identifiers<'a, F>(program: &'a Program<'a>, mut visitor: F)
where
    F: FnMut(&IdentifierObservation),
{
    let mut deferred: VecDeque<ScopeWork<'a>> = VecDeque::new();
    deferred.push_back(ScopeWork {
        items: program.body.iter().map(Item::Stmt).collect(),
        defined: HashSet::new(),
    });

    while let Some(scope) = deferred.pop_front() {
        let mut walker = ScopeWalker {
            defined: scope.defined,
            immediate: scope.items.into(),
            nested: Vec::new(),
            visitor: &mut visitor,
        };
        walker.drain();

        let ScopeWalker { defined, nested, .. } = walker;
        trace!("Scope drained with {} bindings, {} nested scopes", defined.len(), nested.len());
        for items in nested {
            deferred.push_back(ScopeWork { items, defined: defined.clone() });
        }
    }
}

/// A nested scope waiting on the deferred queue, entered with a clone of the
/// enclosing scope's completed binding set.
struct ScopeWork<'a> {
    items: Vec<Item<'a>>,
    defined: HashSet<String>,
}

/// One unit of traversal work inside a scope's immediate queue.
enum Item<'a> {
    Stmt(&'a Statement<'a>),
    Expr(&'a Expression<'a>),
    Pattern(&'a BindingPattern<'a>),
    Params(&'a FormalParameters<'a>),
    PropKey(&'a PropertyKey<'a>, Slot),
    Target(&'a AssignmentTarget<'a>),
    ClassMember(&'a ClassElement<'a>),
    Element(&'a JSXElement<'a>),
    Fragment(&'a JSXFragment<'a>),
    TsType(&'a TSType<'a>),
    Name(&'a str, Slot),
}

struct ScopeWalker<'a, 'v, F> {
    defined: HashSet<String>,
    immediate: VecDeque<Item<'a>>,
    nested: Vec<Vec<Item<'a>>>,
    visitor: &'v mut F,
}

impl<'a, F> ScopeWalker<'a, '_, F>
where
    F: FnMut(&IdentifierObservation),
{
    fn drain(&mut self) {
        while let Some(item) = self.immediate.pop_front() {
            self.step(item);
        }
    }

    /// Pushes children to the front of the immediate queue, preserving
    /// structural order.
    fn enqueue(&mut self, children: Vec<Item<'a>>) {
        for child in children.into_iter().rev() {
            self.immediate.push_front(child);
        }
    }

    fn emit(&mut self, name: &str, slot: Slot) {
        if slot == Slot::Binding {
            self.defined.insert(name.to_string());
        }
        let observation = IdentifierObservation {
            name: name.to_string(),
            is_binding: slot == Slot::Binding,
            is_reference: matches!(slot, Slot::Reference | Slot::Markup | Slot::TypePosition),
            is_markup: slot == Slot::Markup,
            defined_in_scope: self.defined.clone(),
        };
        (self.visitor)(&observation);
    }

    fn step(&mut self, item: Item<'a>) {
        match item {
            Item::Name(name, slot) => self.emit(name, slot),
            Item::Stmt(stmt) => self.step_statement(stmt),
            Item::Expr(expr) => self.step_expression(expr),
            Item::Pattern(pattern) => self.step_pattern(pattern),
            Item::Params(params) => {
                let mut children = Vec::new();
                for param in &params.items {
                    children.push(Item::Pattern(&param.pattern));
                }
                if let Some(rest) = &params.rest {
                    children.push(Item::Pattern(&rest.argument));
                }
                self.enqueue(children);
            }
            Item::PropKey(key, slot) => match key {
                PropertyKey::StaticIdentifier(id) => self.emit(&id.name, slot),
                PropertyKey::PrivateIdentifier(_) => {}
                // Computed keys are ordinary expressions.
                _ => {
                    if let Some(expr) = key.as_expression() {
                        self.enqueue(vec![Item::Expr(expr)]);
                    }
                }
            },
            Item::Target(target) => self.step_assignment_target(target),
            Item::ClassMember(member) => self.step_class_member(member),
            Item::Element(element) => self.step_jsx_element(element),
            Item::Fragment(fragment) => {
                let children = fragment.children.iter().filter_map(jsx_child_item).collect();
                self.enqueue(children);
            }
            Item::TsType(ty) => self.step_ts_type(ty),
        }
    }

    fn step_statement(&mut self, stmt: &'a Statement<'a>) {
        match stmt {
            Statement::VariableDeclaration(vd) => {
                let mut children = Vec::new();
                for declarator in &vd.declarations {
                    children.push(Item::Pattern(&declarator.id));
                    if let Some(init) = &declarator.init {
                        children.push(Item::Expr(init));
                    }
                }
                self.enqueue(children);
            }
            Statement::FunctionDeclaration(f) => self.handle_function(f),
            Statement::ClassDeclaration(c) => self.handle_class(c),
            Statement::ExpressionStatement(s) => self.enqueue(vec![Item::Expr(&s.expression)]),
            Statement::BlockStatement(b) => {
                // Plain blocks stay in the enclosing scope; only function
                // and class bodies defer.
                self.enqueue(b.body.iter().map(Item::Stmt).collect());
            }
            Statement::ReturnStatement(s) => {
                if let Some(argument) = &s.argument {
                    self.enqueue(vec![Item::Expr(argument)]);
                }
            }
            Statement::IfStatement(s) => {
                let mut children = vec![Item::Expr(&s.test), Item::Stmt(&s.consequent)];
                if let Some(alternate) = &s.alternate {
                    children.push(Item::Stmt(alternate));
                }
                self.enqueue(children);
            }
            Statement::WhileStatement(s) => {
                self.enqueue(vec![Item::Expr(&s.test), Item::Stmt(&s.body)]);
            }
            Statement::DoWhileStatement(s) => {
                self.enqueue(vec![Item::Stmt(&s.body), Item::Expr(&s.test)]);
            }
            Statement::ForStatement(s) => {
                let mut children = Vec::new();
                if let Some(init) = &s.init {
                    match init {
                        ForStatementInit::VariableDeclaration(vd) => {
                            for declarator in &vd.declarations {
                                children.push(Item::Pattern(&declarator.id));
                                if let Some(init) = &declarator.init {
                                    children.push(Item::Expr(init));
                                }
                            }
                        }
                        _ => {
                            if let Some(expr) = init.as_expression() {
                                children.push(Item::Expr(expr));
                            }
                        }
                    }
                }
                if let Some(test) = &s.test {
                    children.push(Item::Expr(test));
                }
                if let Some(update) = &s.update {
                    children.push(Item::Expr(update));
                }
                children.push(Item::Stmt(&s.body));
                self.enqueue(children);
            }
            Statement::ForInStatement(s) => self.handle_for_in_of(&s.left, &s.right, &s.body),
            Statement::ForOfStatement(s) => self.handle_for_in_of(&s.left, &s.right, &s.body),
            Statement::SwitchStatement(s) => {
                let mut children = vec![Item::Expr(&s.discriminant)];
                for case in &s.cases {
                    if let Some(test) = &case.test {
                        children.push(Item::Expr(test));
                    }
                    children.extend(case.consequent.iter().map(Item::Stmt));
                }
                self.enqueue(children);
            }
            Statement::TryStatement(s) => {
                let mut children: Vec<Item<'a>> = s.block.body.iter().map(Item::Stmt).collect();
                if let Some(handler) = &s.handler {
                    if let Some(param) = &handler.param {
                        children.push(Item::Pattern(&param.pattern));
                    }
                    children.extend(handler.body.body.iter().map(Item::Stmt));
                }
                if let Some(finalizer) = &s.finalizer {
                    children.extend(finalizer.body.iter().map(Item::Stmt));
                }
                self.enqueue(children);
            }
            Statement::ThrowStatement(s) => self.enqueue(vec![Item::Expr(&s.argument)]),
            Statement::LabeledStatement(s) => self.enqueue(vec![Item::Stmt(&s.body)]),
            Statement::ImportDeclaration(decl) => self.handle_import(decl),
            Statement::ExportNamedDeclaration(decl) => {
                if let Some(declaration) = &decl.declaration {
                    self.step_declaration(declaration);
                }
            }
            Statement::ExportDefaultDeclaration(decl) => match &decl.declaration {
                ExportDefaultDeclarationKind::FunctionDeclaration(f) => self.handle_function(f),
                ExportDefaultDeclarationKind::ClassDeclaration(c) => self.handle_class(c),
                _ => {
                    if let Some(expr) = decl.declaration.as_expression() {
                        self.enqueue(vec![Item::Expr(expr)]);
                    }
                }
            },
            Statement::TSTypeAliasDeclaration(d) => self.emit(&d.id.name, Slot::Binding),
            Statement::TSInterfaceDeclaration(d) => self.emit(&d.id.name, Slot::Binding),
            Statement::TSEnumDeclaration(d) => self.emit(&d.id.name, Slot::Binding),
            // Unrecognized statement shapes produce no observation.
            _ => {}
        }
    }

    fn step_declaration(&mut self, declaration: &'a Declaration<'a>) {
        match declaration {
            Declaration::VariableDeclaration(vd) => {
                let mut children = Vec::new();
                for declarator in &vd.declarations {
                    children.push(Item::Pattern(&declarator.id));
                    if let Some(init) = &declarator.init {
                        children.push(Item::Expr(init));
                    }
                }
                self.enqueue(children);
            }
            Declaration::FunctionDeclaration(f) => self.handle_function(f),
            Declaration::ClassDeclaration(c) => self.handle_class(c),
            Declaration::TSTypeAliasDeclaration(d) => self.emit(&d.id.name, Slot::Binding),
            Declaration::TSInterfaceDeclaration(d) => self.emit(&d.id.name, Slot::Binding),
            Declaration::TSEnumDeclaration(d) => self.emit(&d.id.name, Slot::Binding),
            _ => {}
        }
    }

    fn step_expression(&mut self, expr: &'a Expression<'a>) {
        match expr {
            Expression::Identifier(id) => self.emit(&id.name, Slot::Plain),
            Expression::StaticMemberExpression(m) => {
                self.enqueue(vec![
                    Item::Expr(&m.object),
                    Item::Name(&m.property.name, Slot::Reference),
                ]);
            }
            Expression::ComputedMemberExpression(m) => {
                self.enqueue(vec![Item::Expr(&m.object), Item::Expr(&m.expression)]);
            }
            Expression::PrivateFieldExpression(m) => self.enqueue(vec![Item::Expr(&m.object)]),
            Expression::CallExpression(c) => {
                let mut children = vec![Item::Expr(&c.callee)];
                children.extend(c.arguments.iter().filter_map(argument_item));
                self.enqueue(children);
            }
            Expression::NewExpression(n) => {
                let mut children = vec![Item::Expr(&n.callee)];
                children.extend(n.arguments.iter().filter_map(argument_item));
                self.enqueue(children);
            }
            Expression::ObjectExpression(o) => {
                let mut children = Vec::new();
                for property in &o.properties {
                    match property {
                        ObjectPropertyKind::ObjectProperty(p) => {
                            if p.computed {
                                children.push(Item::PropKey(&p.key, Slot::Plain));
                            } else if !p.shorthand {
                                // Keys name slots on the literal, not
                                // bindings in scope.
                                children.push(Item::PropKey(&p.key, Slot::Reference));
                            }
                            children.push(Item::Expr(&p.value));
                        }
                        ObjectPropertyKind::SpreadProperty(s) => {
                            children.push(Item::Expr(&s.argument));
                        }
                    }
                }
                self.enqueue(children);
            }
            Expression::ArrayExpression(a) => {
                let mut children = Vec::new();
                for element in &a.elements {
                    if let ArrayExpressionElement::SpreadElement(s) = element {
                        children.push(Item::Expr(&s.argument));
                    } else if let Some(expr) = element.as_expression() {
                        children.push(Item::Expr(expr));
                    }
                }
                self.enqueue(children);
            }
            Expression::ArrowFunctionExpression(a) => self.handle_arrow(a),
            Expression::FunctionExpression(f) => self.handle_function(f),
            Expression::ClassExpression(c) => self.handle_class(c),
            Expression::AssignmentExpression(a) => {
                self.enqueue(vec![Item::Target(&a.left), Item::Expr(&a.right)]);
            }
            Expression::BinaryExpression(b) => {
                self.enqueue(vec![Item::Expr(&b.left), Item::Expr(&b.right)]);
            }
            Expression::LogicalExpression(l) => {
                self.enqueue(vec![Item::Expr(&l.left), Item::Expr(&l.right)]);
            }
            Expression::ConditionalExpression(c) => {
                self.enqueue(vec![
                    Item::Expr(&c.test),
                    Item::Expr(&c.consequent),
                    Item::Expr(&c.alternate),
                ]);
            }
            Expression::UnaryExpression(u) => self.enqueue(vec![Item::Expr(&u.argument)]),
            Expression::UpdateExpression(u) => {
                if let SimpleAssignmentTarget::AssignmentTargetIdentifier(id) = &u.argument {
                    self.emit(&id.name, Slot::Plain);
                }
            }
            Expression::AwaitExpression(a) => self.enqueue(vec![Item::Expr(&a.argument)]),
            Expression::YieldExpression(y) => {
                if let Some(argument) = &y.argument {
                    self.enqueue(vec![Item::Expr(argument)]);
                }
            }
            Expression::SequenceExpression(s) => {
                self.enqueue(s.expressions.iter().map(Item::Expr).collect());
            }
            Expression::ParenthesizedExpression(p) => {
                self.enqueue(vec![Item::Expr(&p.expression)]);
            }
            Expression::TemplateLiteral(t) => {
                self.enqueue(t.expressions.iter().map(Item::Expr).collect());
            }
            Expression::TaggedTemplateExpression(t) => {
                let mut children = vec![Item::Expr(&t.tag)];
                children.extend(t.quasi.expressions.iter().map(Item::Expr));
                self.enqueue(children);
            }
            Expression::ChainExpression(c) => match &c.expression {
                ChainElement::CallExpression(call) => {
                    let mut children = vec![Item::Expr(&call.callee)];
                    children.extend(call.arguments.iter().filter_map(argument_item));
                    self.enqueue(children);
                }
                ChainElement::StaticMemberExpression(m) => {
                    self.enqueue(vec![
                        Item::Expr(&m.object),
                        Item::Name(&m.property.name, Slot::Reference),
                    ]);
                }
                ChainElement::ComputedMemberExpression(m) => {
                    self.enqueue(vec![Item::Expr(&m.object), Item::Expr(&m.expression)]);
                }
                _ => {}
            },
            Expression::JSXElement(element) => self.step_jsx_element(element),
            Expression::JSXFragment(fragment) => {
                let children = fragment.children.iter().filter_map(jsx_child_item).collect();
                self.enqueue(children);
            }
            Expression::TSAsExpression(e) => {
                self.enqueue(vec![Item::Expr(&e.expression), Item::TsType(&e.type_annotation)]);
            }
            Expression::TSNonNullExpression(e) => self.enqueue(vec![Item::Expr(&e.expression)]),
            Expression::TSSatisfiesExpression(e) => {
                self.enqueue(vec![Item::Expr(&e.expression), Item::TsType(&e.type_annotation)]);
            }
            // Literals, this, meta-properties, and unrecognized shapes.
            _ => {}
        }
    }

    fn step_pattern(&mut self, pattern: &'a BindingPattern<'a>) {
        let mut children = Vec::new();
        match &pattern.kind {
            BindingPatternKind::BindingIdentifier(id) => self.emit(&id.name, Slot::Binding),
            BindingPatternKind::ObjectPattern(obj) => {
                for property in &obj.properties {
                    // Shorthand keys bind through the value pattern;
                    // non-shorthand keys name slots on the source object and
                    // get no observation of their own.
                    if property.computed {
                        children.push(Item::PropKey(&property.key, Slot::Plain));
                    }
                    children.push(Item::Pattern(&property.value));
                }
                if let Some(rest) = &obj.rest {
                    children.push(Item::Pattern(&rest.argument));
                }
            }
            BindingPatternKind::ArrayPattern(arr) => {
                for element in arr.elements.iter().flatten() {
                    children.push(Item::Pattern(element));
                }
                if let Some(rest) = &arr.rest {
                    children.push(Item::Pattern(&rest.argument));
                }
            }
            BindingPatternKind::AssignmentPattern(ap) => {
                children.push(Item::Pattern(&ap.left));
                children.push(Item::Expr(&ap.right));
            }
        }
        if let Some(annotation) = &pattern.type_annotation {
            children.push(Item::TsType(&annotation.type_annotation));
        }
        self.enqueue(children);
    }

    fn step_assignment_target(&mut self, target: &'a AssignmentTarget<'a>) {
        match target {
            AssignmentTarget::AssignmentTargetIdentifier(id) => self.emit(&id.name, Slot::Plain),
            AssignmentTarget::StaticMemberExpression(m) => {
                self.enqueue(vec![
                    Item::Expr(&m.object),
                    Item::Name(&m.property.name, Slot::Reference),
                ]);
            }
            AssignmentTarget::ComputedMemberExpression(m) => {
                self.enqueue(vec![Item::Expr(&m.object), Item::Expr(&m.expression)]);
            }
            // Destructuring assignment targets and TS casts: tolerated, no
            // observation.
            _ => {}
        }
    }

    fn step_class_member(&mut self, member: &'a ClassElement<'a>) {
        match member {
            ClassElement::MethodDefinition(m) => {
                if m.computed {
                    self.enqueue(vec![Item::PropKey(&m.key, Slot::Plain)]);
                } else {
                    self.enqueue(vec![Item::PropKey(&m.key, Slot::Reference)]);
                }
                self.handle_function(&m.value);
            }
            ClassElement::PropertyDefinition(p) => {
                let mut children = Vec::new();
                if p.computed {
                    children.push(Item::PropKey(&p.key, Slot::Plain));
                } else {
                    children.push(Item::PropKey(&p.key, Slot::Reference));
                }
                if let Some(value) = &p.value {
                    children.push(Item::Expr(value));
                }
                self.enqueue(children);
            }
            ClassElement::StaticBlock(b) => {
                self.enqueue(b.body.iter().map(Item::Stmt).collect());
            }
            _ => {}
        }
    }

    fn step_jsx_element(&mut self, element: &'a JSXElement<'a>) {
        self.handle_jsx_opening(&element.opening_element);
        let children = element.children.iter().filter_map(jsx_child_item).collect();
        self.enqueue(children);
    }

    fn handle_jsx_opening(&mut self, opening: &'a JSXOpeningElement<'a>) {
        if let Some(name) = jsx_tag_name(&opening.name) {
            self.emit(name, Slot::Markup);
        }
        let mut children = Vec::new();
        for attribute in &opening.attributes {
            match attribute {
                JSXAttributeItem::Attribute(a) => {
                    if let Some(JSXAttributeValue::ExpressionContainer(container)) = &a.value
                        && let Some(expr) = container.expression.as_expression()
                    {
                        children.push(Item::Expr(expr));
                    }
                }
                JSXAttributeItem::SpreadAttribute(s) => children.push(Item::Expr(&s.argument)),
            }
        }
        self.enqueue(children);
    }

    fn step_ts_type(&mut self, ty: &'a TSType<'a>) {
        match ty {
            TSType::TSTypeReference(r) => {
                // Only the leftmost name of a qualified reference can need
                // an import.
                let mut name = &r.type_name;
                loop {
                    match name {
                        TSTypeName::IdentifierReference(id) => {
                            self.emit(&id.name, Slot::TypePosition);
                            break;
                        }
                        TSTypeName::QualifiedName(q) => name = &q.left,
                        #[allow(unreachable_patterns)]
                        _ => break,
                    }
                }
            }
            TSType::TSUnionType(u) => self.enqueue(u.types.iter().map(Item::TsType).collect()),
            TSType::TSIntersectionType(i) => {
                self.enqueue(i.types.iter().map(Item::TsType).collect());
            }
            TSType::TSArrayType(a) => self.enqueue(vec![Item::TsType(&a.element_type)]),
            _ => {}
        }
    }

    fn handle_import(&mut self, decl: &'a ImportDeclaration<'a>) {
        let Some(specifiers) = &decl.specifiers else { return };
        for specifier in specifiers {
            match specifier {
                ImportDeclarationSpecifier::ImportSpecifier(s) => {
                    match &s.imported {
                        ModuleExportName::IdentifierName(id) => self.emit(&id.name, Slot::Binding),
                        ModuleExportName::IdentifierReference(id) => {
                            self.emit(&id.name, Slot::Binding);
                        }
                        ModuleExportName::StringLiteral(_) => {}
                    }
                    self.emit(&s.local.name, Slot::Binding);
                }
                ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                    self.emit(&s.local.name, Slot::Binding);
                }
                ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                    self.emit(&s.local.name, Slot::Binding);
                }
            }
        }
    }

    fn handle_for_in_of(
        &mut self,
        left: &'a ForStatementLeft<'a>,
        right: &'a Expression<'a>,
        body: &'a Statement<'a>,
    ) {
        let mut children = Vec::new();
        match left {
            ForStatementLeft::VariableDeclaration(vd) => {
                for declarator in &vd.declarations {
                    children.push(Item::Pattern(&declarator.id));
                }
            }
            ForStatementLeft::AssignmentTargetIdentifier(id) => {
                self.emit(&id.name, Slot::Plain);
            }
            _ => {}
        }
        children.push(Item::Expr(right));
        children.push(Item::Stmt(body));
        self.enqueue(children);
    }

    /// Function name binds in the enclosing scope; parameters and body make
    /// up a deferred nested scope.
    fn handle_function(&mut self, f: &'a Function<'a>) {
        if let Some(id) = &f.id {
            self.emit(&id.name, Slot::Binding);
        }
        let mut scope_items = vec![Item::Params(&f.params)];
        if let Some(body) = &f.body {
            scope_items.extend(body.statements.iter().map(Item::Stmt));
        }
        self.nested.push(scope_items);
    }

    fn handle_arrow(&mut self, arrow: &'a ArrowFunctionExpression<'a>) {
        let mut scope_items = vec![Item::Params(&arrow.params)];
        scope_items.extend(arrow.body.statements.iter().map(Item::Stmt));
        self.nested.push(scope_items);
    }

    /// Class name and superclass belong to the enclosing scope; the member
    /// sequence is a deferred nested scope of its own.
    fn handle_class(&mut self, class: &'a Class<'a>) {
        if let Some(id) = &class.id {
            self.emit(&id.name, Slot::Binding);
        }
        if let Some(super_class) = &class.super_class {
            self.enqueue(vec![Item::Expr(super_class)]);
        }
        self.nested.push(class.body.body.iter().map(Item::ClassMember).collect());
    }
}

fn argument_item<'a>(argument: &'a Argument<'a>) -> Option<Item<'a>> {
    if let Argument::SpreadElement(s) = argument {
        Some(Item::Expr(&s.argument))
    } else {
        argument.as_expression().map(Item::Expr)
    }
}

fn jsx_child_item<'a>(child: &'a JSXChild<'a>) -> Option<Item<'a>> {
    match child {
        JSXChild::Element(element) => Some(Item::Element(element)),
        JSXChild::Fragment(fragment) => Some(Item::Fragment(fragment)),
        JSXChild::ExpressionContainer(container) => {
            container.expression.as_expression().map(Item::Expr)
        }
        JSXChild::Spread(spread) => Some(Item::Expr(&spread.expression)),
        _ => None,
    }
}

/// The whole tag of an opening element, or the innermost object of a dotted
/// tag like `<Foo.Bar.Baz />`.
fn jsx_tag_name<'a>(name: &'a JSXElementName<'a>) -> Option<&'a str> {
    match name {
        JSXElementName::Identifier(id) => Some(id.name.as_str()),
        JSXElementName::IdentifierReference(id) => Some(id.name.as_str()),
        JSXElementName::MemberExpression(member) => jsx_object_name(&member.object),
        // Namespaced names and `<this.Foo>` tags name nothing importable.
        _ => None,
    }
}

fn jsx_object_name<'a>(object: &'a JSXMemberExpressionObject<'a>) -> Option<&'a str> {
    match object {
        JSXMemberExpressionObject::IdentifierReference(id) => Some(id.name.as_str()),
        JSXMemberExpressionObject::MemberExpression(member) => jsx_object_name(&member.object),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{source_type_for, with_program};
    use std::path::Path;

    fn observations_for(file: &str, source: &str) -> Vec<IdentifierObservation> {
        let st = source_type_for(Path::new(file));
        let mut observations = Vec::new();
        with_program(source, st, |program| {
            visit_identifiers(program, |obs| observations.push(obs.clone()));
        })
        .unwrap();
        observations
    }

    fn find<'o>(
        observations: &'o [IdentifierObservation],
        name: &str,
    ) -> &'o IdentifierObservation {
        observations
            .iter()
            .find(|o| o.name == name)
            .unwrap_or_else(|| panic!("no observation for '{name}'"))
    }

    #[test]
    fn test_sibling_and_param_bindings_visible_inside_function() {
        let observations =
            observations_for("a.js", "const a = 1;\nfunction f(b) { return a + b + c; }");
        let c = find(&observations, "c");
        assert!(!c.is_binding);
        assert!(!c.is_reference);
        assert!(c.defined_in_scope.contains("a"));
        assert!(c.defined_in_scope.contains("b"));
        assert!(c.defined_in_scope.contains("f"));
    }

    #[test]
    fn test_hoisting_across_source_order() {
        // `second` is declared after `first` but must be in scope inside it.
        let observations =
            observations_for("a.js", "function first() { return second; }\nfunction second() {}");
        let use_of_second =
            observations.iter().find(|o| o.name == "second" && !o.is_binding).unwrap();
        assert!(use_of_second.defined_in_scope.contains("second"));
        assert!(use_of_second.defined_in_scope.contains("first"));
    }

    #[test]
    fn test_nested_bindings_do_not_leak_outward() {
        let observations =
            observations_for("a.js", "function f() { const inner = 1; }\nconst x = outer;");
        let outer = find(&observations, "outer");
        assert!(!outer.defined_in_scope.contains("inner"));
        // The nested observation still sees its own binding.
        let inner = find(&observations, "inner");
        assert!(inner.is_binding);
        assert!(inner.defined_in_scope.contains("inner"));
    }

    #[test]
    fn test_import_specifiers_bind() {
        let observations =
            observations_for("a.js", "import def, { a as b } from 'm';\nconst y = def + b;");
        assert!(find(&observations, "def").is_binding);
        let y = find(&observations, "y");
        assert!(y.defined_in_scope.contains("def"));
        assert!(y.defined_in_scope.contains("a"));
        assert!(y.defined_in_scope.contains("b"));
    }

    #[test]
    fn test_property_access_is_reference() {
        let observations = observations_for("a.js", "foo.bar;");
        let foo = find(&observations, "foo");
        assert!(!foo.is_reference);
        let bar = find(&observations, "bar");
        assert!(bar.is_reference);
        assert!(!bar.is_binding);
    }

    #[test]
    fn test_object_literal_keys_are_references() {
        let observations = observations_for("a.js", "const o = { key: value, shorthand };");
        let key = find(&observations, "key");
        assert!(key.is_reference);
        let value = find(&observations, "value");
        assert!(!value.is_reference && !value.is_binding);
        let shorthand = find(&observations, "shorthand");
        assert!(!shorthand.is_reference && !shorthand.is_binding);
    }

    #[test]
    fn test_destructuring_bindings() {
        let observations = observations_for("a.js", "const { a, b: c = d, ...rest } = obj;");
        assert!(find(&observations, "a").is_binding);
        assert!(find(&observations, "c").is_binding);
        assert!(find(&observations, "rest").is_binding);
        let d = find(&observations, "d");
        assert!(!d.is_binding);
        let obj = find(&observations, "obj");
        assert!(!obj.is_binding);
        // The pattern key `b` binds nothing and is not observed.
        assert!(observations.iter().all(|o| o.name != "b"));
    }

    #[test]
    fn test_default_value_pattern_in_params() {
        let observations = observations_for("a.js", "function f(a, { b }, c = fallback) {}");
        assert!(find(&observations, "a").is_binding);
        assert!(find(&observations, "b").is_binding);
        assert!(find(&observations, "c").is_binding);
        assert!(!find(&observations, "fallback").is_binding);
    }

    #[test]
    fn test_jsx_tag_is_markup_reference() {
        let observations = observations_for("a.jsx", "const el = <Widget prop={data} />;");
        let widget = find(&observations, "Widget");
        assert!(widget.is_markup);
        assert!(widget.is_reference);
        assert!(!widget.is_binding);
        let data = find(&observations, "data");
        assert!(!data.is_markup);
    }

    #[test]
    fn test_dotted_jsx_tag_reports_object_part() {
        let observations = observations_for("a.jsx", "const el = <Foo.Bar />;");
        let foo = find(&observations, "Foo");
        assert!(foo.is_markup);
        assert!(observations.iter().all(|o| o.name != "Bar"));
    }

    #[test]
    fn test_type_annotation_is_reference() {
        let observations = observations_for("a.ts", "const a: Props = b;");
        let props = find(&observations, "Props");
        assert!(props.is_reference);
        assert!(!props.is_binding);
        assert!(!props.is_markup);
    }

    #[test]
    fn test_class_members() {
        let observations = observations_for(
            "a.js",
            "class Widget extends Base { render() { return this.props; } }",
        );
        assert!(find(&observations, "Widget").is_binding);
        assert!(!find(&observations, "Base").is_binding);
        assert!(find(&observations, "render").is_reference);
        assert!(find(&observations, "props").is_reference);
    }

    #[test]
    fn test_arrow_scope_sees_enclosing_bindings() {
        let observations = observations_for("a.js", "const fn = (x) => x + y;");
        let y = find(&observations, "y");
        assert!(y.defined_in_scope.contains("fn"));
        assert!(y.defined_in_scope.contains("x"));
    }

    #[test]
    fn test_unusual_shapes_are_tolerated() {
        // Nothing here should panic or observe incorrectly.
        let observations = observations_for(
            "a.ts",
            "label: for (;;) break label;\n\
             switch (kind) { case 1: run(); }\n\
             try { risky(); } catch (err) { log(err); } finally { done(); }\n\
             tag`tpl ${value}`;",
        );
        assert!(find(&observations, "err").is_binding);
        assert!(!find(&observations, "kind").is_binding);
        assert!(!find(&observations, "value").is_binding);
    }
}
