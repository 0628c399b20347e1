use selection_toggler::{
    Error, Harness, NodeId, Result, SelectionConfig, SelectionMode, SelectionToggler,
    attach_remover, log_on_click,
};

const THREE_ITEMS_HTML: &str = r#"
    <ul id='list'>
      <li id='a' class='click-me'>a</li>
      <li id='b' class='click-me'>b</li>
      <li id='c' class='click-me'>c</li>
    </ul>
    "#;

fn selection_state(harness: &Harness, nodes: &[NodeId], class_name: &str) -> Vec<bool> {
    nodes
        .iter()
        .map(|node| harness.has_class(*node, class_name))
        .collect()
}

#[test]
fn exclusive_mode_moves_selection_between_siblings() -> Result<()> {
    let mut harness = Harness::from_html(THREE_ITEMS_HTML)?;
    let items = harness.query_all(".click-me")?;
    let toggler = SelectionToggler::new(SelectionConfig::new(
        "selected",
        SelectionMode::Exclusive,
    )?);
    toggler.attach(&mut harness, &items);
    assert_eq!(
        selection_state(&harness, &items, "selected"),
        vec![false, false, false]
    );

    harness.click("#b")?;
    assert_eq!(
        selection_state(&harness, &items, "selected"),
        vec![false, true, false]
    );

    harness.click("#c")?;
    assert_eq!(
        selection_state(&harness, &items, "selected"),
        vec![false, false, true]
    );
    Ok(())
}

#[test]
fn toggle_mode_flips_a_single_element() -> Result<()> {
    let mut harness = Harness::from_html("<div><button id='a' class='click-me'>a</button></div>")?;
    let a = harness.query_one("#a")?;
    let toggler = SelectionToggler::new(SelectionConfig::new("big", SelectionMode::Toggle)?);
    toggler.attach(&mut harness, &[a]);

    harness.click("#a")?;
    harness.assert_class("#a", "big")?;
    harness.click("#a")?;
    harness.assert_no_class("#a", "big")?;
    harness.click("#a")?;
    harness.assert_class("#a", "big")?;
    Ok(())
}

#[test]
fn attaching_an_empty_group_registers_nothing() -> Result<()> {
    let mut harness = Harness::from_html("<ul id='list'></ul>")?;
    let toggler = SelectionToggler::new(SelectionConfig::new(
        "selected",
        SelectionMode::Exclusive,
    )?);
    toggler.attach(&mut harness, &[]);
    assert_eq!(harness.total_listener_count(), 0);
    assert_eq!(toggler.attach_to_marker(&mut harness), 0);
    assert_eq!(harness.total_listener_count(), 0);
    Ok(())
}

#[test]
fn exclusive_reclick_keeps_element_selected() -> Result<()> {
    let mut harness = Harness::from_html(THREE_ITEMS_HTML)?;
    let toggler = SelectionToggler::new(SelectionConfig::new(
        "selected",
        SelectionMode::Exclusive,
    )?);
    toggler.attach_to_marker(&mut harness);

    harness.click("#a")?;
    let once = harness.dump_dom("#list")?;
    harness.click("#a")?;
    assert_eq!(harness.dump_dom("#list")?, once);
    harness.assert_class("#a", "selected")?;
    Ok(())
}

#[test]
fn exclusive_mode_clears_preselected_siblings_from_markup() -> Result<()> {
    let mut harness = Harness::from_html(
        r#"
        <ul id='list'>
          <li id='a' class='click-me selected'>a</li>
          <li id='b' class='click-me selected'>b</li>
          <li id='c' class='click-me'>c</li>
        </ul>
        "#,
    )?;
    let toggler = SelectionToggler::new(SelectionConfig::new(
        "selected",
        SelectionMode::Exclusive,
    )?);
    toggler.attach_to_marker(&mut harness);

    harness.click("#c")?;
    let list = harness.query_one("#list")?;
    assert_eq!(toggler.selected(&harness, list), vec![harness.query_one("#c")?]);
    harness.assert_class("#a", "click-me")?;
    Ok(())
}

#[test]
fn groups_under_different_parents_are_isolated() -> Result<()> {
    let mut harness = Harness::from_html(
        r#"
        <ul id='left'>
          <li id='l1' class='click-me'>1</li>
          <li id='l2' class='click-me'>2</li>
        </ul>
        <ul id='right'>
          <li id='r1' class='click-me'>1</li>
          <li id='r2' class='click-me'>2</li>
        </ul>
        "#,
    )?;
    let toggler = SelectionToggler::new(SelectionConfig::new(
        "selected",
        SelectionMode::Exclusive,
    )?);
    assert_eq!(toggler.attach_to_marker(&mut harness), 4);

    harness.click("#l1")?;
    harness.click("#r2")?;
    harness.click("#l2")?;
    harness.assert_class("#l2", "selected")?;
    harness.assert_no_class("#l1", "selected")?;
    harness.assert_class("#r2", "selected")?;
    harness.assert_no_class("#r1", "selected")?;
    Ok(())
}

#[test]
fn removed_entry_click_after_removal_has_no_effect() -> Result<()> {
    let mut harness = Harness::from_html(THREE_ITEMS_HTML)?;
    let items = harness.query_all(".click-me")?;
    let toggler = SelectionToggler::new(SelectionConfig::new(
        "selected",
        SelectionMode::Toggle,
    )?);
    toggler.attach(&mut harness, &items);

    let before = harness.dump_dom("#list")?;
    harness.remove_node(items[0])?;
    harness.click_node(items[0])?;
    assert!(!harness.has_class(items[0], "selected"));
    assert_ne!(harness.dump_dom("#list")?, before);
    assert!(matches!(
        harness.query_one("#a"),
        Err(Error::SelectorNotFound(_))
    ));
    Ok(())
}

#[test]
fn button_click_logs_and_list_entries_remove_themselves() -> Result<()> {
    let mut harness = Harness::from_html(
        r#"
        <button id='hello'>Click</button>
        <ul id='list'>
          <li id='a' class='click-me'>a</li>
          <li id='b' class='click-me'>b</li>
        </ul>
        "#,
    )?;
    let button = harness.query_one("button")?;
    log_on_click(&mut harness, button, "YOU CLICK GOOD");
    let items = harness.query_all("#list > li")?;
    attach_remover(&mut harness, &items);

    harness.click("button")?;
    harness.click("#a")?;
    assert_eq!(harness.take_console_logs(), vec!["YOU CLICK GOOD"]);
    harness.assert_text("#list > li", "b")?;
    Ok(())
}
