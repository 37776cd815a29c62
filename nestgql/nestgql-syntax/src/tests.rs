use std::{fs, path::PathBuf};

use assert_matches::assert_matches;
use indoc::indoc;
use pretty_assertions::assert_eq;

use crate::{
    ast::{ClassMember, EnumEntry, Item, OtherKind, PropertyToken},
    options::ObjectLiteral,
};

use super::*;

#[rstest::rstest]
fn roundtrip(#[files("test-cases/roundtrip/*.ts")] path: PathBuf) {
    let source = fs::read_to_string(&path).unwrap();
    let file = parse_source(&source).unwrap();

    assert_eq!(source, print_source(&file));
}

#[test]
fn parse_generated_model() {
    let file = parse_source(indoc! {r#"
        import { Field, ObjectType } from '@nestjs/graphql';

        @ObjectType({ description: undefined })
        export class User {
            @Field(() => String, { nullable: false, description: "user id" })
            id!: string;

            @Field(() => [User], { nullable: true })
            followers?: Array<User>;
        }
    "#})
    .unwrap();

    assert_eq!(file.items.len(), 2);
    assert_eq!(file.imported_names().collect::<Vec<_>>(), vec!["Field", "ObjectType"]);

    let user = file.class("User").unwrap();
    assert!(user.exported);
    assert_eq!(
        user.decorator("ObjectType").unwrap().arguments,
        Some(vec!["{ description: undefined }".to_string()])
    );

    let id = user.property("id").unwrap();
    assert_eq!(id.token, PropertyToken::Exclamation);
    assert_eq!(id.ty.as_deref(), Some("string"));
    let field = id.decorator("Field").unwrap();
    assert_eq!(field.argument(0), Some("() => String"));
    assert_eq!(
        field.argument(1),
        Some(r#"{ nullable: false, description: "user id" }"#)
    );

    let followers = user.property("followers").unwrap();
    assert_eq!(followers.token, PropertyToken::Question);
    assert_eq!(followers.ty.as_deref(), Some("Array<User>"));
}

#[test]
fn non_canonical_layout_is_normalized() {
    let file = parse_source(indoc! {r#"
        import {Field} from "@nestjs/graphql"
        @InputType()
        export class UserWhereInput{
          @Field(() => Int,{nullable:true})
          count?:number
          label: string = 'x'
        }
    "#})
    .unwrap();

    assert_eq!(
        print_source(&file),
        indoc! {r#"
            import { Field } from '@nestjs/graphql';

            @InputType()
            export class UserWhereInput {
                @Field(() => Int, {nullable:true})
                count?: number;

                label: string = 'x';
            }
        "#}
    );
}

#[test]
fn unmodelled_members_are_kept_verbatim() {
    let file = parse_source(indoc! {"
        export class Service {
            private cache = new Map<string, number>();

            async load(id: string): Promise<void> {
                await this.fetch(id);
            }

            static create() { return new Service(); }
        }
    "})
    .unwrap();

    let service = file.class("Service").unwrap();
    assert_matches!(&service.members[0], ClassMember::Property(property) if property.name == "cache");
    assert_matches!(&service.members[1], ClassMember::Other(text) if text.starts_with("async load"));
    assert_matches!(&service.members[2], ClassMember::Other(text) if text == "static create() { return new Service(); }");
}

#[test]
fn other_declarations_are_named() {
    let file = parse_source(indoc! {"
        export interface User {
            id: string;
        }

        type Alias = string;

        export async function load() {}

        export const enum Flag {
            On,
        }
    "})
    .unwrap();

    let kinds: Vec<_> = file
        .items
        .iter()
        .map(|item| (item.describe(), item.declared_name()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("interface", Some("User")),
            ("type alias", Some("Alias")),
            ("function", Some("load")),
            ("enum", Some("Flag")),
        ]
    );
    assert_matches!(&file.items[0], Item::Other(other) if other.kind == OtherKind::Interface);
    assert_eq!(file.position_of("load"), Some(2));
}

#[test]
fn enum_members_and_comments() {
    let file = parse_source(indoc! {r#"
        export enum Role {
            /** regular */
            USER = 'USER',
            ADMIN
        }
    "#})
    .unwrap();

    let role = file.enum_decl("Role").unwrap();
    assert_matches!(&role.entries[0], EnumEntry::Comment(text) if text == "/** regular */");
    let members: Vec<_> = role
        .members()
        .map(|member| (member.name.as_str(), member.initializer.as_deref()))
        .collect();
    assert_eq!(members, vec![("USER", Some("'USER'")), ("ADMIN", None)]);
}

#[test]
fn block_comments() {
    let file = parse_source("/** doc */\n/* plain\n * lines */\nexport class A {}\n").unwrap();
    assert_matches!(&file.items[0], Item::Comment(text) if text == "/** doc */");
    assert_matches!(&file.items[1], Item::Comment(text) if text == "/* plain\n * lines */");
    assert!(file.class("A").is_some());

    assert_matches!(
        parse_source("/* open\nexport class A {}\n"),
        Err(SyntaxError { span, .. }) if span.start == 0
    );
}

#[test]
fn trailing_comment_terminates_a_property() {
    let file = parse_source(indoc! {"
        export class Profile {
            name?: string // display name
            age: number
        }
    "})
    .unwrap();

    let profile = file.class("Profile").unwrap();
    let name = profile.property("name").unwrap();
    assert_eq!(name.ty.as_deref(), Some("string"));
    assert_eq!(name.trailing_comment.as_deref(), Some("// display name"));
    assert!(profile.property("age").is_some());

    assert_eq!(
        print_source(&file),
        indoc! {"
            export class Profile {
                name?: string; // display name

                age: number;
            }
        "}
    );
}

#[test]
fn side_effect_import_is_a_statement() {
    let file = parse_source("import 'reflect-metadata';\n").unwrap();
    assert_matches!(&file.items[0], Item::Other(other) if other.text == "import 'reflect-metadata';");
}

#[test]
fn syntax_errors() {
    assert_matches!(
        parse_source("export class User {\n    id!: string;\n"),
        Err(SyntaxError { msg, .. }) if msg == "unterminated class body"
    );
    assert_matches!(
        parse_source("const x = (1;\n"),
        Err(SyntaxError { msg, .. }) if msg == "mismatched bracket" || msg == "unclosed bracket"
    );
    assert_matches!(
        parse_source("const x = 1 ¤ 2;"),
        Err(SyntaxError { span, .. }) if span.start == 12
    );
    assert_matches!(parse_source("}"), Err(_));
}

#[test]
fn object_literal_options() {
    let mut options = ObjectLiteral::parse(
        r#"{ nullable: true, description: "a, b", complexity: (x) => fn(x, 1) }"#,
    )
    .unwrap();

    assert_eq!(options.get("nullable"), Some("true"));
    assert_eq!(options.get("description"), Some(r#""a, b""#));
    assert_eq!(options.get("complexity"), Some("(x) => fn(x, 1)"));

    options.set("nullable", "false");
    options.set("defaultValue", "1");
    assert_eq!(options.remove("description"), Some(r#""a, b""#.to_string()));
    assert_eq!(
        options.to_string(),
        "{ nullable: false, complexity: (x) => fn(x, 1), defaultValue: 1 }"
    );

    assert_eq!(ObjectLiteral::parse("{}").unwrap().to_string(), "{}");
    assert_eq!(ObjectLiteral::parse("{ ...rest }"), None);
    assert_eq!(ObjectLiteral::parse("{ nullable }"), None);
    assert_eq!(ObjectLiteral::parse("() => Int"), None);
}
