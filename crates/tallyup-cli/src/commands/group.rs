use anyhow::Result;
use tallyup_application::AppServices;
use tallyup_core::group::Group;

use super::utils::print_json;

pub async fn create(
    services: &AppServices,
    name: &str,
    creator: &str,
    members: Vec<String>,
    json: bool,
) -> Result<()> {
    let group = services.groups.create_group(name, creator, members).await?;
    if json {
        return print_json(&group);
    }
    println!("✅ Created group '{}' ({})", group.name, group.id);
    println!("   Join code: {}", group.code);
    print_members(&group);
    Ok(())
}

pub async fn join(services: &AppServices, code: &str, member: &str, json: bool) -> Result<()> {
    let group = services.groups.join_group(code, member).await?;
    if json {
        return print_json(&group);
    }
    println!("✅ {} is a member of '{}' ({})", member, group.name, group.id);
    print_members(&group);
    Ok(())
}

pub async fn list(services: &AppServices, member: &str, json: bool) -> Result<()> {
    let groups = services.groups.groups_for_member(member).await?;
    if json {
        return print_json(&groups);
    }
    if groups.is_empty() {
        println!("{} is not in any group yet.", member);
        return Ok(());
    }
    for group in &groups {
        println!(
            "{}  {}  [{}]  {} members",
            group.id,
            group.name,
            group.code,
            group.member_count()
        );
    }
    Ok(())
}

fn print_members(group: &Group) {
    let members: Vec<&str> = group.members.iter().map(String::as_str).collect();
    println!("   Members: {}", members.join(", "));
}
